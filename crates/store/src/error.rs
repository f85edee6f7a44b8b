use playlist_share_core::{PlaylistId, ValidationError};
use thiserror::Error;

/// Failure reported by a record store backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The backend could not be reached or did not answer.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The backend answered and refused the write.
    #[error("record store rejected write: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("playlist {0} not found")]
    NotFound(PlaylistId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A write did not commit. Nothing from it should be assumed saved.
    #[error("could not save changes: {0}")]
    Persistence(String),

    /// A read could not be served.
    #[error("playlist storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn on_read(err: RecordError) -> Self {
        match err {
            RecordError::Unavailable(msg) => StoreError::Unavailable(msg),
            RecordError::Rejected(msg) => StoreError::Persistence(msg),
        }
    }

    pub(crate) fn on_write(err: RecordError) -> Self {
        match err {
            RecordError::Unavailable(msg) | RecordError::Rejected(msg) => {
                StoreError::Persistence(msg)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
