use crate::{CatalogError, CatalogTransport, Result, TrackCatalogClient};
use async_trait::async_trait;
use playlist_share_core::urls::{catalog_search_url, upscale_artwork};
use playlist_share_core::{CandidateTrack, CatalogConfig, PreviewHandle};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    track_id: Option<u64>,
    track_name: Option<String>,
    artist_name: Option<String>,
    artwork_url100: Option<String>,
    preview_url: Option<String>,
    track_time_millis: Option<u64>,
}

pub struct ItunesCatalog<T> {
    cfg: CatalogConfig,
    transport: T,
}

impl<T: CatalogTransport> ItunesCatalog<T> {
    pub fn new(cfg: CatalogConfig, transport: T) -> Self {
        Self { cfg, transport }
    }

    fn to_candidate(&self, r: SearchResult) -> Option<CandidateTrack> {
        let catalog_id = r.track_id?.to_string();
        Some(CandidateTrack {
            catalog_id,
            title: r.track_name.unwrap_or_else(|| "Unknown Title".to_string()),
            artist: r.artist_name.unwrap_or_else(|| "Unknown Artist".to_string()),
            cover_url: r
                .artwork_url100
                .map(|u| upscale_artwork(&u, self.cfg.artwork_size)),
            preview: r
                .preview_url
                .filter(|u| !u.trim().is_empty())
                .map(PreviewHandle::new),
            duration_ms: r.track_time_millis,
        })
    }
}

#[async_trait]
impl<T: CatalogTransport> TrackCatalogClient for ItunesCatalog<T> {
    fn name(&self) -> &'static str {
        "itunes"
    }

    async fn search(&self, term: &str) -> Result<Vec<CandidateTrack>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }

        let url = catalog_search_url(&self.cfg, term)?;
        let body = self.transport.get(&url).await.map_err(|err| {
            warn!(error = %err, term, "catalog search failed");
            err
        })?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Parse(e.to_string()))?;

        let total = parsed.results.len();
        let tracks: Vec<CandidateTrack> = parsed
            .results
            .into_iter()
            .filter_map(|r| self.to_candidate(r))
            .take(self.cfg.result_limit)
            .collect();

        debug!(term, total, kept = tracks.len(), "catalog search done");
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::ItunesCatalog;
    use crate::{CatalogError, CatalogTransport, Result, TrackCatalogClient};
    use async_trait::async_trait;
    use playlist_share_core::CatalogConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use url::Url;

    struct CannedTransport {
        calls: Arc<AtomicUsize>,
        body: std::result::Result<String, String>,
    }

    #[async_trait]
    impl CatalogTransport for CannedTransport {
        async fn get(&self, _url: &Url) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().map_err(CatalogError::Transport)
        }
    }

    fn catalog(
        body: std::result::Result<&str, &str>,
    ) -> (ItunesCatalog<CannedTransport>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let transport = CannedTransport {
            calls: calls.clone(),
            body: body.map(str::to_string).map_err(str::to_string),
        };
        (ItunesCatalog::new(CatalogConfig::default(), transport), calls)
    }

    const TWO_RESULTS: &str = r#"{
        "resultCount": 2,
        "results": [
            {"trackId": 11, "trackName": "Get Lucky", "artistName": "Daft Punk",
             "artworkUrl100": "https://img/100x100bb.jpg",
             "previewUrl": "https://audio/11.m4a", "trackTimeMillis": 248000},
            {"trackId": 12, "trackName": "Instant Crush", "artistName": "Daft Punk",
             "artworkUrl100": "https://img/100x100bb.jpg"}
        ]
    }"#;

    #[tokio::test]
    async fn blank_term_short_circuits() {
        let (catalog, calls) = catalog(Ok(TWO_RESULTS));
        assert!(catalog.search("").await.unwrap().is_empty());
        assert!(catalog.search("   ").await.unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn maps_results_and_preview_presence() {
        let (catalog, calls) = catalog(Ok(TWO_RESULTS));
        let tracks = catalog.search("daft punk").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].catalog_id, "11");
        assert!(tracks[0].is_playable());
        assert_eq!(tracks[0].cover_url.as_deref(), Some("https://img/600x600bb.jpg"));
        assert_eq!(tracks[0].duration_ms, Some(248_000));
        assert!(!tracks[1].is_playable());
    }

    #[tokio::test]
    async fn empty_results_are_success() {
        let (catalog, _) = catalog(Ok(r#"{"resultCount":0,"results":[]}"#));
        assert!(catalog.search("zzzz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparseable_body_is_an_error() {
        let (catalog, _) = catalog(Ok("<html>busy</html>"));
        let err = catalog.search("daft punk").await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let (catalog, _) = catalog(Err("connection reset"));
        let err = catalog.search("daft punk").await.unwrap_err();
        assert!(matches!(err, CatalogError::Transport(_)));
    }
}
