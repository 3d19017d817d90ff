//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// Photo catalog source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// HTTP endpoint returning the catalog as a JSON array
    pub endpoint: String,

    /// Local JSON catalog; takes precedence over `endpoint` when set
    pub catalog_path: Option<String>,

    /// Catalog request timeout in milliseconds
    pub timeout_ms: u64,

    /// Append `t=<millis>` to thumbnail URLs so stale cached thumbnails are bypassed
    pub cache_bust: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/photos".to_string(),
            catalog_path: None,
            timeout_ms: 10_000,
            cache_bust: false,
        }
    }
}

/// Gallery filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Known categories. `"all"` is always implied and need not be listed.
    pub categories: Vec<String>,

    /// Category selected at mount
    pub default_category: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            categories: vec![
                "random".to_string(),
                "animals".to_string(),
                "food".to_string(),
                "fashion".to_string(),
                "travel".to_string(),
            ],
            default_category: crate::types::ALL_CATEGORY.to_string(),
        }
    }
}

/// Deferred image loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyLoadConfig {
    /// Lookahead margin in pixels before an element enters the viewport
    pub offset: f64,
}

impl Default for LazyLoadConfig {
    fn default() -> Self {
        Self { offset: 1000.0 }
    }
}

/// Average-color sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Longest edge of the downsampled grid, in pixels
    pub grid_size: u32,

    /// Pixels with alpha below this value are left out of the average
    pub alpha_threshold: u8,

    /// Color used when pixels cannot be read
    pub fallback: Rgb,

    /// Sampling timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            grid_size: 32,
            alpha_threshold: u8::MAX,
            fallback: Rgb::NEUTRAL,
            timeout_ms: 2_000,
        }
    }
}

/// Image loader settings (thumbnails for sampling, full-size prefetch).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Per-image request timeout in milliseconds
    pub timeout_ms: u64,

    /// Decoded images kept for prefetch hits
    pub cache_entries: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            cache_entries: 16,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log format (pretty or json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
