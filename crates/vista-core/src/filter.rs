//! Category filtering of the photo catalog.
//!
//! [`filter`] is the pure derivation; [`CategoryFilter`] memoizes it against
//! the identity of the catalog `Arc` and the category string, so unrelated
//! state changes (modal transitions, loading flags) reuse the last result.

use std::sync::{Arc, Mutex};

use crate::store::lock;
use crate::types::{GalleryState, Photo, ALL_CATEGORY};

/// Order-preserving subset of `photos` matching `category`.
///
/// `"all"` selects every photo.
pub fn filter(photos: &[Photo], category: &str) -> Vec<Photo> {
    if category == ALL_CATEGORY {
        return photos.to_vec();
    }
    photos
        .iter()
        .filter(|photo| photo.category == category)
        .cloned()
        .collect()
}

struct Memo {
    photos: Arc<Vec<Photo>>,
    category: String,
    result: Arc<Vec<Photo>>,
}

/// Memoizing wrapper around [`filter`].
#[derive(Default)]
pub struct CategoryFilter {
    memo: Mutex<Option<Memo>>,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filtered photos for the given catalog and category.
    ///
    /// Recomputes only when `photos` is a different catalog (by pointer) or
    /// `category` changed since the previous call.
    pub fn apply(&self, photos: &Arc<Vec<Photo>>, category: &str) -> Arc<Vec<Photo>> {
        let mut memo = lock(&self.memo);
        if let Some(m) = memo.as_ref() {
            if Arc::ptr_eq(&m.photos, photos) && m.category == category {
                return m.result.clone();
            }
        }

        let result = if category == ALL_CATEGORY {
            // Same list, same order: share the catalog itself
            photos.clone()
        } else {
            Arc::new(filter(photos, category))
        };
        tracing::trace!(
            "Filtered {} photos to {} for '{}'",
            photos.len(),
            result.len(),
            category
        );
        *memo = Some(Memo {
            photos: photos.clone(),
            category: category.to_string(),
            result: result.clone(),
        });
        result
    }

    /// Convenience for a gallery snapshot.
    pub fn visible(&self, gallery: &GalleryState) -> Arc<Vec<Photo>> {
        self.apply(&gallery.photos, &gallery.category)
    }
}
