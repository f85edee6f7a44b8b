use async_trait::async_trait;
use playlist_share_core::{CandidateTrack, CatalogConfig};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

mod error;
mod http;
mod itunes;

pub use error::{CatalogError, Result};
pub use http::HttpTransport;
pub use itunes::ItunesCatalog;

/// Free-text track search against an external catalog.
#[async_trait]
pub trait TrackCatalogClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Blank terms resolve to an empty list without touching the network.
    /// Any other term issues exactly one request.
    async fn search(&self, term: &str) -> Result<Vec<CandidateTrack>>;
}

/// One GET returning the response body. Split out so the catalog can be
/// driven without a network in tests.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<String>;
}

pub fn build_catalog(cfg: &CatalogConfig) -> Result<Arc<dyn TrackCatalogClient>> {
    let transport = HttpTransport::new(Duration::from_millis(cfg.request_timeout_ms))?;
    Ok(Arc::new(ItunesCatalog::new(cfg.clone(), transport)))
}
