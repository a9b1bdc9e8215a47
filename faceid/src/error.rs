use facelog_kv::KVError;
use thiserror::Error;

/// Errors returned by faceid operations.
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("faceid: store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("faceid: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("faceid: insufficient samples: need {need}, got {got}")]
    InsufficientSamples { need: usize, got: usize },

    #[error("faceid: invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("faceid: malformed record: {0}")]
    MalformedRecord(String),

    #[error("faceid: embedder error: {0}")]
    Embedder(String),
}

impl From<KVError> for FaceError {
    fn from(e: KVError) -> Self {
        FaceError::StoreUnavailable(e.to_string())
    }
}
