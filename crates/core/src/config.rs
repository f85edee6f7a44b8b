use serde::{Deserialize, Serialize};

fn default_schema_version() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub base_url: String,
    pub country: Option<String>,
    pub result_limit: usize,
    pub request_timeout_ms: u64,
    pub artwork_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://itunes.apple.com".to_string(),
            country: None,
            result_limit: 10,
            request_timeout_ms: 10_000,
            artwork_size: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding every playlist and entry. Relative paths resolve
    /// against the config file's directory.
    pub data_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: "playlists.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub owner_id: String,
    pub log_level: String,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            owner_id: "local-user".to_string(),
            log_level: "info".to_string(),
            catalog: CatalogConfig::default(),
            store: StoreConfig::default(),
        }
    }
}
