//! Core data types for the Vista gallery.
//!
//! `Photo` records are immutable once received; the state types are plain
//! values that the store replaces wholesale on each transition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Sentinel category that selects every photo.
pub const ALL_CATEGORY: &str = "all";

/// A single catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Stable identifier from the photo source
    pub id: String,

    /// Small rendition shown in the grid
    pub thumbnail_url: String,

    /// Full-size rendition shown in the modal
    pub full_url: String,

    /// Alternative text (empty when the source has none)
    pub alt_text: String,

    /// Category tag used by the filter
    pub category: String,

    /// Optional responsive source set for the thumbnail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_srcset: Option<String>,
}

/// An 8-bit RGB color.
///
/// Serialized as a `#rrggbb` hex string so it reads naturally in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Neutral mid grey.
    pub const NEUTRAL: Rgb = Rgb::new(0x80, 0x80, 0x80);

    /// CSS functional notation, e.g. `rgb(10, 20, 30)`.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #rrggbb, got '{s}'"));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("invalid color '{s}': {e}"))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// Progress of the catalog retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadingStatus {
    #[default]
    Idle,
    Pending,
    Done,
    /// Retrieval failed with a reason code
    Error(String),
}

/// Gallery half of the application state.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryState {
    /// Current catalog, replaced wholesale on every successful fetch
    pub photos: Arc<Vec<Photo>>,
    pub loading_status: LoadingStatus,
    /// Active category; always `"all"` or a member of the known set
    pub category: String,
}

impl Default for GalleryState {
    fn default() -> Self {
        Self {
            photos: Arc::new(Vec::new()),
            loading_status: LoadingStatus::Idle,
            category: ALL_CATEGORY.to_string(),
        }
    }
}

/// Modal overlay state. `visible` implies `src` is set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModalState {
    pub visible: bool,
    pub src: Option<String>,
    pub alt_text: Option<String>,
    pub bg_color: Option<Rgb>,
}

/// Immutable snapshot handed to every store reader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub gallery: GalleryState,
    pub modal: ModalState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_roundtrip() {
        let color: Rgb = "#0a141e".parse().unwrap();
        assert_eq!(color, Rgb::new(10, 20, 30));
        assert_eq!(color.to_string(), "#0a141e");
        assert_eq!(color.to_css(), "rgb(10, 20, 30)");
    }

    #[test]
    fn test_rgb_parse_without_hash() {
        assert_eq!("808080".parse::<Rgb>().unwrap(), Rgb::NEUTRAL);
    }

    #[test]
    fn test_rgb_parse_rejects_garbage() {
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("#ééé".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_default_state_is_empty() {
        let state = AppState::default();
        assert!(state.gallery.photos.is_empty());
        assert_eq!(state.gallery.category, ALL_CATEGORY);
        assert_eq!(state.gallery.loading_status, LoadingStatus::Idle);
        assert!(!state.modal.visible);
        assert!(state.modal.src.is_none());
    }

    #[test]
    fn test_photo_serializes_without_empty_srcset() {
        let photo = Photo {
            id: "a".into(),
            thumbnail_url: "t".into(),
            full_url: "f".into(),
            alt_text: String::new(),
            category: "nature".into(),
            thumbnail_srcset: None,
        };
        let json = serde_json::to_string(&photo).unwrap();
        assert!(!json.contains("srcset"));
    }
}
