//! HTTP photo source.

use async_trait::async_trait;
use std::time::Duration;

use super::source::{parse_catalog, CatalogRecord, PhotoSource};
use crate::config::SourceConfig;
use crate::error::FetchError;

/// Fetches the catalog as a JSON array from an HTTP endpoint.
pub struct HttpPhotoSource {
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpPhotoSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Self {
        Self::new(&config.endpoint, Duration::from_millis(config.timeout_ms))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PhotoSource for HttpPhotoSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_catalog(&self) -> Result<Vec<CatalogRecord>, FetchError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    FetchError::Network {
                        url: self.endpoint.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| FetchError::Network {
            url: self.endpoint.clone(),
            message: format!("Failed to read body: {e}"),
        })?;
        parse_catalog(&body)
    }
}
