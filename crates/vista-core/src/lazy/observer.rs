//! Lazy-load observer: swaps real image sources in once per element.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::surface::{ElementId, RenderSurface};
use super::watcher::{ProximityEntry, ProximityWatcher};
use crate::config::LazyLoadConfig;
use crate::store::lock;
use crate::types::Photo;

/// Watches thumbnail placeholders and loads the real image when one comes
/// within `offset` pixels of the viewport.
///
/// An element's entry is removed from the pending map *before* its source is
/// swapped, so repeated or concurrent visibility reports for the same element
/// swap at most once.
pub struct LazyLoadObserver {
    watcher: Arc<dyn ProximityWatcher>,
    surface: Arc<dyn RenderSurface>,
    offset: f64,
    pending: Mutex<HashMap<ElementId, Photo>>,
    loaded: AtomicUsize,
}

impl LazyLoadObserver {
    pub fn new(
        watcher: Arc<dyn ProximityWatcher>,
        surface: Arc<dyn RenderSurface>,
        config: &LazyLoadConfig,
    ) -> Self {
        Self {
            watcher,
            surface,
            offset: config.offset,
            pending: Mutex::new(HashMap::new()),
            loaded: AtomicUsize::new(0),
        }
    }

    /// Lookahead margin in pixels.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Start watching `element`, which renders `photo`.
    ///
    /// If the host cannot watch the element, the real source is swapped in
    /// immediately instead.
    pub fn register(&self, element: ElementId, photo: Photo) {
        lock(&self.pending).insert(element, photo);

        if let Err(e) = self.watcher.watch(element, self.offset) {
            tracing::warn!("Loading {:?} eagerly: {}", element, e);
            self.trigger(element);
        }
    }

    /// Stop watching `element`. Safe to call for unknown or already-loaded elements.
    pub fn unregister(&self, element: ElementId) {
        let removed = lock(&self.pending).remove(&element).is_some();
        if removed {
            self.watcher.unwatch(element);
        }
    }

    /// Process a batch of visibility reports from the host.
    ///
    /// Returns how many elements were loaded by this batch.
    pub fn handle_entries(&self, entries: &[ProximityEntry]) -> usize {
        entries
            .iter()
            .filter(|entry| entry.is_near)
            .filter(|entry| self.trigger(entry.element))
            .count()
    }

    /// Load `element` now if it is still pending. Returns whether it loaded.
    pub fn trigger(&self, element: ElementId) -> bool {
        let photo = lock(&self.pending).remove(&element);
        match photo {
            Some(photo) => {
                self.watcher.unwatch(element);
                self.swap_in(element, &photo);
                self.loaded.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Stop all watching and drop every pending entry.
    pub fn disconnect_all(&self) {
        let dropped = {
            let mut pending = lock(&self.pending);
            let n = pending.len();
            pending.clear();
            n
        };
        self.watcher.disconnect();
        tracing::debug!("Lazy-load observer disconnected ({} pending dropped)", dropped);
    }

    /// Elements registered but not yet loaded.
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_pending(&self, element: ElementId) -> bool {
        lock(&self.pending).contains_key(&element)
    }

    /// Elements loaded over the observer's lifetime.
    pub fn loaded_count(&self) -> usize {
        self.loaded.load(Ordering::Relaxed)
    }

    fn swap_in(&self, element: ElementId, photo: &Photo) {
        tracing::trace!("Loading {} into {:?}", photo.id, element);
        if let Some(srcset) = &photo.thumbnail_srcset {
            self.surface.set_attribute(element, "srcset", srcset);
            self.surface.remove_attribute(element, "data-srcset");
        }
        self.surface
            .set_attribute(element, "src", &photo.thumbnail_url);
        self.surface.remove_attribute(element, "data-src");
    }
}

impl Drop for LazyLoadObserver {
    fn drop(&mut self) {
        if self.pending_count() > 0 {
            self.disconnect_all();
        }
    }
}
