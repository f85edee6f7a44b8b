use playlist_share_catalog::{build_catalog, CatalogError};
use playlist_share_core::CatalogConfig;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> CatalogConfig {
    CatalogConfig {
        base_url: server.uri(),
        result_limit: 2,
        ..CatalogConfig::default()
    }
}

#[tokio::test]
async fn search_hits_endpoint_and_caps_results() {
    let server = MockServer::start().await;
    let body = serde_json::json!({
        "resultCount": 3,
        "results": [
            {"trackId": 1, "trackName": "One", "artistName": "A", "previewUrl": "https://p/1"},
            {"trackId": 2, "trackName": "Two", "artistName": "B"},
            {"trackId": 3, "trackName": "Three", "artistName": "C"}
        ]
    });

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("term", "one two"))
        .and(query_param("entity", "song"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = build_catalog(&config_for(&server)).unwrap();
    let tracks = catalog.search("one two").await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, "One");
    assert!(tracks[0].is_playable());
    assert!(!tracks[1].is_playable());
}

#[tokio::test]
async fn server_error_is_reported_not_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let catalog = build_catalog(&config_for(&server)).unwrap();
    let err = catalog.search("anything").await.unwrap_err();

    assert!(matches!(err, CatalogError::Status { status: 503 }));
}

#[tokio::test]
async fn empty_term_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let catalog = build_catalog(&config_for(&server)).unwrap();
    assert!(catalog.search("").await.unwrap().is_empty());
}
