use thiserror::Error;

/// Every variant means the catalog could not answer. A successful empty
/// result is `Ok(vec![])`, never an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(String),

    #[error("catalog returned HTTP {status}")]
    Status { status: u16 },

    #[error("catalog response could not be parsed: {0}")]
    Parse(String),

    #[error("invalid catalog url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
