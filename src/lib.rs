pub mod config;
pub mod embedding;
pub mod error;
pub mod image_list;
pub mod model_store;
pub mod pipeline;

pub use config::EmbeddingConfig;
pub use embedding::{encode_image_base64, EmbeddingProvider, SimpleEmbedder};
pub use error::BatchError;
pub use image_list::read_image_list;
pub use model_store::Model;
pub use pipeline::{BatchPipeline, RunSummary};
