//! Static asset retrieval (vector data files)

use crate::{MapError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::time::Duration;

/// Shared HTTP client for data files and weather requests
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("firemap/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
});

/// Loads the text of a data file named in the layer registry
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// `http(s)://` URLs go over the network, anything else is read from disk
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = HTTP_CLIENT.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(MapError::Layer(format!("GET {url} returned {status}")));
            }
            return Ok(response.text().await?);
        }

        let path = url.strip_prefix("file://").unwrap_or(url);

        #[cfg(feature = "tokio-runtime")]
        let text = tokio::fs::read_to_string(path).await?;
        #[cfg(not(feature = "tokio-runtime"))]
        let text = std::fs::read_to_string(path)?;

        Ok(text)
    }
}
