//! Image loading for color sampling and full-size prefetch.

use async_trait::async_trait;
use image::DynamicImage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

use crate::color::PixelSource;
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::store::lock;

/// Fetches and decodes images by URL.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load and decode the image at `url`.
    async fn load(&self, url: &str) -> Result<Arc<dyn PixelSource>, LoadError>;

    /// Warm whatever cache the loader keeps. Failures are logged, not returned.
    async fn prefetch(&self, url: &str) {
        if let Err(e) = self.load(url).await {
            tracing::debug!("Prefetch of {} failed: {}", url, e);
        }
    }

    /// Whether `url` would be served without a new request.
    fn is_cached(&self, _url: &str) -> bool {
        false
    }
}

/// Loads images over HTTP and keeps recently used ones in an LRU cache.
///
/// A `cache_entries` of 0 disables caching.
pub struct HttpImageLoader {
    client: reqwest::Client,
    timeout: Duration,
    cache: Option<Mutex<LruCache<String, Arc<DynamicImage>>>>,
}

impl HttpImageLoader {
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(config.timeout_ms),
            cache: NonZeroUsize::new(config.cache_entries)
                .map(|capacity| Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Number of decoded images currently cached.
    pub fn cached_count(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| lock(cache).len())
    }

    fn cached(&self, url: &str) -> Option<Arc<DynamicImage>> {
        self.cache.as_ref().and_then(|cache| lock(cache).get(url).cloned())
    }

    fn remember(&self, url: &str, image: Arc<DynamicImage>) {
        if let Some(cache) = &self.cache {
            if let Some((evicted, _)) = lock(cache).push(url.to_string(), image) {
                if evicted != url {
                    tracing::trace!("Evicted {} from image cache", evicted);
                }
            }
        }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| LoadError::Request {
                url: url.to_string(),
                message: e.to_string(),
                status_code: None,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Request {
                url: url.to_string(),
                message: format!("HTTP {status}"),
                status_code: Some(status.as_u16()),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| LoadError::Request {
            url: url.to_string(),
            message: format!("Failed to read body: {e}"),
            status_code: None,
        })?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl ImageLoader for HttpImageLoader {
    async fn load(&self, url: &str) -> Result<Arc<dyn PixelSource>, LoadError> {
        let cached = self.cached(url);
        if let Some(hit) = cached {
            tracing::trace!("Image cache hit: {}", url);
            return Ok(hit as Arc<dyn PixelSource>);
        }

        let bytes = timeout(self.timeout, self.download(url))
            .await
            .map_err(|_| LoadError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        let owned_url = url.to_string();
        let image = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| LoadError::Decode {
                url: owned_url.clone(),
                message: format!("Task join error: {e}"),
            })?
            .map_err(|e| LoadError::Decode {
                url: owned_url,
                message: e.to_string(),
            })?;

        let image = Arc::new(image);
        self.remember(url, image.clone());
        Ok(image as Arc<dyn PixelSource>)
    }

    fn is_cached(&self, url: &str) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|cache| lock(cache).contains(url))
    }
}
