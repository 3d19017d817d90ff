//! What the rendering layer should show for the gallery area.

use std::sync::Arc;

use crate::filter::CategoryFilter;
use crate::types::{GalleryState, LoadingStatus, Photo};

/// Gallery view derived from a state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryView {
    /// Nothing fetched yet, or a fetch is in flight
    Loading,
    /// The latest fetch failed
    Error { reason: String },
    /// Photos to render, already filtered by category
    Ready(Arc<Vec<Photo>>),
}

impl GalleryView {
    pub fn derive(gallery: &GalleryState, filter: &CategoryFilter) -> Self {
        match &gallery.loading_status {
            LoadingStatus::Error(reason) => GalleryView::Error {
                reason: reason.clone(),
            },
            LoadingStatus::Done => GalleryView::Ready(filter.visible(gallery)),
            LoadingStatus::Idle | LoadingStatus::Pending => GalleryView::Loading,
        }
    }
}
