use std::path::PathBuf;

/// Errors raised by the segmentation and lookup engine and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Failed to read dictionary chunk {chunk_id}: {source}")]
    ChunkIo {
        chunk_id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode dictionary chunk {chunk_id}: {source}")]
    ChunkDecode {
        chunk_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cost mismatch at position {position}: forward pass {expected}, backtracking {actual}")]
    CostMismatch {
        position: usize,
        expected: f64,
        actual: f64,
    },

    #[error("Cost array has {actual} entries, expected {expected}")]
    InvalidCostArray { expected: usize, actual: usize },

    #[error("Blacklist I/O error at {path:?}: {source}")]
    BlacklistIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse blacklist at {path:?}: {source}")]
    BlacklistParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid chunk manifest entry: {entry}")]
    InvalidManifest { entry: String },
}

pub type Result<T, E = GuardError> = std::result::Result<T, E>;
