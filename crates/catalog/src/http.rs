use crate::{CatalogError, CatalogTransport, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!("playlist-share/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "catalog request");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))
    }
}
