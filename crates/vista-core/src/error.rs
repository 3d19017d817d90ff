//! Error types for the Vista gallery core.
//!
//! Errors are organized by component so callers get actionable messages with
//! the relevant context (URLs, paths, status codes). Only fetch and
//! configuration errors ever reach the rendering layer; sampling and loading
//! errors are absorbed by the components that produce them.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Vista operations.
#[derive(Error, Debug)]
pub enum VistaError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog retrieval errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Image loading errors
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Catalog retrieval errors.
///
/// Each variant maps to a short, stable reason code via [`FetchError::reason`],
/// which is what lands in the store on `FETCH_ERROR`.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection refused, TLS)
    #[error("Request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The catalog body could not be parsed
    #[error("Malformed catalog: {0}")]
    Decode(String),

    /// Retrieval did not complete in time
    #[error("Catalog retrieval timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Local catalog file could not be read
    #[error("Failed to read catalog {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl FetchError {
    /// Short reason code stored in the gallery state.
    pub fn reason(&self) -> String {
        match self {
            FetchError::Network { .. } => "network".to_string(),
            FetchError::Status { status, .. } => format!("http_{status}"),
            FetchError::Decode(_) => "decode".to_string(),
            FetchError::Timeout { .. } => "timeout".to_string(),
            FetchError::Io { .. } => "io".to_string(),
        }
    }
}

/// Pixel sampling failures. Never surfaced past the sampler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// Pixel data may not be read (e.g. a cross-origin tainted image)
    #[error("Pixel access denied: {0}")]
    AccessDenied(String),

    /// Image bytes could not be decoded
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Every sampled pixel was below the alpha threshold
    #[error("No opaque pixels to average")]
    NoOpaquePixels,

    /// Sampling did not finish in time
    #[error("Sampling timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Image loader failures.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Request failed or returned a non-success status
    #[error("Failed to load {url}: {message}")]
    Request {
        url: String,
        message: String,
        status_code: Option<u16>,
    },

    /// Response body was not a decodable image
    #[error("Failed to decode {url}: {message}")]
    Decode { url: String, message: String },

    /// Load did not finish in time
    #[error("Loading {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },
}

/// Convenience type alias for Vista results.
pub type Result<T> = std::result::Result<T, VistaError>;
