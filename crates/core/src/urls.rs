use crate::config::CatalogConfig;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use url::Url;

/// Builds the song search request for an iTunes-compatible catalog.
pub fn catalog_search_url(cfg: &CatalogConfig, term: &str) -> Result<Url, url::ParseError> {
    let base = cfg.base_url.trim_end_matches('/');
    let encoded = utf8_percent_encode(term.trim(), NON_ALPHANUMERIC).to_string();
    let mut raw = format!(
        "{base}/search?term={encoded}&entity=song&limit={}",
        cfg.result_limit
    );
    if let Some(country) = cfg.country.as_deref().filter(|c| !c.trim().is_empty()) {
        raw.push_str("&country=");
        raw.push_str(&utf8_percent_encode(country.trim(), NON_ALPHANUMERIC).to_string());
    }
    Url::parse(&raw)
}

/// Catalog artwork comes back at 100px; ask the CDN for a larger square.
pub fn upscale_artwork(url: &str, size: u32) -> String {
    url.replace("100x100bb", &format!("{size}x{size}bb"))
}

#[cfg(test)]
mod tests {
    use super::{catalog_search_url, upscale_artwork};
    use crate::config::CatalogConfig;

    #[test]
    fn search_url_encodes_term_and_limit() {
        let cfg = CatalogConfig::default();
        let url = catalog_search_url(&cfg, " AC/DC Back In Black ").unwrap();

        assert_eq!(url.path(), "/search");
        assert!(url.as_str().contains("term=AC%2FDC%20Back%20In%20Black"));
        assert!(url.as_str().contains("entity=song"));
        assert!(url.as_str().contains("limit=10"));
        assert!(!url.as_str().contains("country="));
    }

    #[test]
    fn search_url_appends_country() {
        let cfg = CatalogConfig {
            base_url: "http://localhost:9000/".to_string(),
            country: Some("it".to_string()),
            ..CatalogConfig::default()
        };
        let url = catalog_search_url(&cfg, "Daft Punk").unwrap();
        assert!(url.as_str().starts_with("http://localhost:9000/search?"));
        assert!(url.as_str().ends_with("&country=it"));
    }

    #[test]
    fn artwork_is_upscaled() {
        let art = "https://is1.mzstatic.com/image/thumb/x/100x100bb.jpg";
        assert_eq!(
            upscale_artwork(art, 600),
            "https://is1.mzstatic.com/image/thumb/x/600x600bb.jpg"
        );
        assert_eq!(upscale_artwork("https://a/b.png", 600), "https://a/b.png");
    }
}
