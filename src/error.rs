use std::path::PathBuf;

use thiserror::Error;

/// Fatal, program-tier failures. Per-image errors are recovered inside the
/// pipeline (logged and skipped) and never surface as this type.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Image list file does not exist: {0}")]
    ImageListMissing(PathBuf),

    #[error("Failed to read image list {path}: {source}")]
    ImageListRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write model file {path}: {source}")]
    ModelWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize model: {0}")]
    ModelSerialize(#[from] serde_json::Error),
}
