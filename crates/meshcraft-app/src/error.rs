/*
[INPUT]:  Adapter errors and store-level precondition failures
[OUTPUT]: StoreError returned by store operations, ErrorNotice kept in snapshots
[POS]:    Error handling layer for state containers
[UPDATE]: When a store gains a new failure mode
*/

use meshcraft_adapter::{ErrorKind, MeshcraftError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] MeshcraftError),

    /// A toggle for this model is still waiting on the backend
    #[error("a request for model {model_id} is already in flight")]
    AlreadyInFlight { model_id: String },

    #[error("image index {index} out of range ({len} images)")]
    InvalidSelection { index: usize, len: usize },

    #[error("no active generation task")]
    NoActiveTask,

    /// Teardown happened before the request finished
    #[error("operation cancelled")]
    Cancelled,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Api(err) => err.kind(),
            StoreError::AlreadyInFlight { .. }
            | StoreError::InvalidSelection { .. }
            | StoreError::NoActiveTask => ErrorKind::Validation,
            StoreError::Cancelled => ErrorKind::Unknown,
        }
    }
}

/// User-visible error kept in a store snapshot after a failed read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&MeshcraftError> for ErrorNotice {
    fn from(err: &MeshcraftError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}
