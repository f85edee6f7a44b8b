use playlist_share_catalog::CatalogError;
use playlist_share_core::{PlaylistId, ValidationError};
use playlist_share_engine::SequencerError;
use playlist_share_store::StoreError;
use thiserror::Error;

/// Every collaborator failure the controller can report, tagged by kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("playlist {0} not found")]
    NotFound(PlaylistId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("could not save changes: {0}")]
    Persistence(String),

    #[error("playlist storage unavailable: {0}")]
    Unavailable(String),

    #[error("track search unavailable: {0}")]
    CatalogUnavailable(String),

    #[error(transparent)]
    Playback(#[from] SequencerError),
}

impl ControllerError {
    /// Text for the user. Never includes transport details.
    pub fn user_message(&self) -> String {
        match self {
            ControllerError::NotFound(_) => "Playlist not found.".to_string(),
            ControllerError::Validation(ValidationError::EmptyTitle) => {
                "Please enter a playlist title.".to_string()
            }
            ControllerError::Persistence(_) => {
                "Could not save your changes. Please try again.".to_string()
            }
            ControllerError::Unavailable(_) => {
                "Could not load this playlist. Please try again.".to_string()
            }
            ControllerError::CatalogUnavailable(_) => {
                "Search is unavailable right now. Please try again.".to_string()
            }
            ControllerError::Playback(_) => "Could not play this preview.".to_string(),
        }
    }

    /// Transient failures the caller may offer to retry. The controller
    /// itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ControllerError::Persistence(_)
                | ControllerError::Unavailable(_)
                | ControllerError::CatalogUnavailable(_)
        )
    }
}

impl From<StoreError> for ControllerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ControllerError::NotFound(id),
            StoreError::Validation(v) => ControllerError::Validation(v),
            StoreError::Persistence(msg) => ControllerError::Persistence(msg),
            StoreError::Unavailable(msg) => ControllerError::Unavailable(msg),
        }
    }
}

impl From<CatalogError> for ControllerError {
    fn from(err: CatalogError) -> Self {
        ControllerError::CatalogUnavailable(err.to_string())
    }
}
