use thiserror::Error;

/// Input rejected before any collaborator is contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("playlist title cannot be empty")]
    EmptyTitle,
}
