//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::types::ALL_CATEGORY;

use super::Config;

/// Levels accepted by `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Formats accepted by `logging.format`.
pub const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.source.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "source.timeout_ms must be > 0".into(),
            ));
        }
        if self.source.catalog_path.is_none() && self.source.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "source.endpoint must be set when source.catalog_path is not".into(),
            ));
        }
        if self.gallery.categories.iter().any(|c| c.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "gallery.categories must not contain empty names".into(),
            ));
        }
        if self.gallery.default_category != ALL_CATEGORY
            && !self
                .gallery
                .categories
                .contains(&self.gallery.default_category)
        {
            return Err(ConfigError::ValidationError(format!(
                "gallery.default_category '{}' is not a known category",
                self.gallery.default_category
            )));
        }
        if !self.lazy_load.offset.is_finite() || self.lazy_load.offset < 0.0 {
            return Err(ConfigError::ValidationError(
                "lazy_load.offset must be a non-negative number".into(),
            ));
        }
        if self.color.grid_size == 0 {
            return Err(ConfigError::ValidationError(
                "color.grid_size must be > 0".into(),
            ));
        }
        if self.color.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "color.timeout_ms must be > 0".into(),
            ));
        }
        if self.loader.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "loader.timeout_ms must be > 0".into(),
            ));
        }
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level '{}' must be one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format '{}' must be one of {}",
                self.logging.format,
                LOG_FORMATS.join(", ")
            )));
        }
        Ok(())
    }
}
