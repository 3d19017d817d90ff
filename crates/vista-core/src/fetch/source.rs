//! Photo source trait and catalog record format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::types::Photo;

/// Resource locators of a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogUrls {
    pub small: String,
    pub full: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcset: Option<String>,
}

/// One record as delivered by a photo source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub urls: CatalogUrls,
    #[serde(default, alias = "alt_description")]
    pub alt: Option<String>,
    pub category: String,
}

impl CatalogRecord {
    /// Map to a gallery photo, optionally tagging the thumbnail URL with a
    /// cache-busting timestamp.
    pub fn into_photo(self, cache_bust: Option<u128>) -> Photo {
        let thumbnail_url = match cache_bust {
            Some(stamp) => cache_busted(&self.urls.small, stamp),
            None => self.urls.small,
        };
        Photo {
            id: self.id,
            thumbnail_url,
            full_url: self.urls.full,
            alt_text: self.alt.unwrap_or_default(),
            category: self.category,
            thumbnail_srcset: self.urls.srcset,
        }
    }
}

/// Append a `t=<stamp>` query parameter to `url`.
pub fn cache_busted(url: &str, stamp: u128) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}t={stamp}")
}

/// Parse a JSON catalog body.
pub fn parse_catalog(body: &str) -> Result<Vec<CatalogRecord>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Anything that can deliver the photo catalog.
///
/// Uses `async_trait` so sources can be held as `Arc<dyn PhotoSource>`.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Retrieve the full, ordered catalog.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogRecord>, FetchError>;
}
