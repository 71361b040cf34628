use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use imgvec::{BatchPipeline, EmbeddingConfig, SimpleEmbedder};
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "imgvec")]
#[command(about = "Batch-embed images and merge the vectors into a JSON model file")]
#[command(version)]
struct Cli {
    /// Text file with one image path per line
    image_list: PathBuf,

    /// JSON model file to update (created if missing)
    model_file: PathBuf,

    /// Embedding model name
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the embedding service
    #[arg(long)]
    base_url: Option<String>,
}

fn apply_cli_overrides(config: &mut EmbeddingConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A usage error exits with status 1, not clap's default of 2. Help and
    // version output are not usage errors.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(1),
            }
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = EmbeddingConfig::from_env()?;
    apply_cli_overrides(&mut config, &cli);

    let embedder = SimpleEmbedder::from_config(&config);
    let pipeline = BatchPipeline::new(embedder);

    if let Err(e) = pipeline.run(&cli.image_list, &cli.model_file).await {
        error!("{}", e);
        process::exit(1);
    }

    Ok(())
}
