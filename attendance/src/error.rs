use std::time::Duration;

use facelog_faceid::FaceError;
use facelog_kv::KVError;
use thiserror::Error;

/// Errors returned by attendance operations.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("attendance: store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("attendance: store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("attendance: malformed record: {0}")]
    MalformedRecord(String),

    #[error(transparent)]
    Face(#[from] FaceError),
}

impl From<KVError> for AttendanceError {
    fn from(e: KVError) -> Self {
        AttendanceError::StoreUnavailable(e.to_string())
    }
}
