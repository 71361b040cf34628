use std::collections::BTreeMap;
use std::path::Path;

use tracing::{error, info};

use crate::embedding::SimpleEmbedder;
use crate::error::BatchError;
use crate::image_list::read_image_list;
use crate::model_store::Model;

/// Outcome of a batch run. A run that embedded nothing is still a success;
/// only program-tier failures abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
}

/// The sequential batch pipeline: read the image list, embed each image in
/// order, then merge the successful results into the persisted model.
#[derive(Debug, Clone)]
pub struct BatchPipeline {
    embedder: SimpleEmbedder,
}

impl BatchPipeline {
    pub fn new(embedder: SimpleEmbedder) -> Self {
        Self { embedder }
    }

    pub async fn run(&self, list_path: &Path, model_path: &Path) -> Result<RunSummary, BatchError> {
        let image_paths = read_image_list(list_path)?;
        let total = image_paths.len();
        info!("Found {} images to process", total);

        let mut results: BTreeMap<String, Vec<f32>> = BTreeMap::new();
        for (i, image_path) in image_paths.iter().enumerate() {
            // Each failure is isolated to its own image; the batch continues.
            match self.embedder.embed_image(Path::new(image_path)).await {
                Ok(vector) => {
                    results.insert(image_path.clone(), vector);
                }
                Err(e) => {
                    error!("Processing {}: {:#}", image_path, e);
                }
            }
            info!("Processed {}/{}: {}", i + 1, total, image_path);
        }

        let succeeded = results.len();
        info!("Successfully processed {} embeddings", succeeded);

        let mut model = Model::load(model_path);
        model.merge(results);
        model.save(model_path)?;
        info!("Saved updated model to {}", model_path.display());

        Ok(RunSummary { total, succeeded })
    }
}
