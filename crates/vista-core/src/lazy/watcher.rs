//! Proximity watchers: the host's "is this element near the viewport" primitive.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

use super::geometry::Rect;
use super::surface::ElementId;
use crate::store::lock;

/// A visibility report for one watched element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityEntry {
    pub element: ElementId,
    /// True when the element is within the lookahead margin of the viewport
    pub is_near: bool,
}

/// Why an element could not be watched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// The host has no proximity capability at all
    #[error("Proximity watching is not supported by this host")]
    Unsupported,

    /// The host refused this particular element
    #[error("Cannot watch element {0:?}: {1}")]
    Rejected(ElementId, String),
}

/// Host visibility/intersection primitive.
///
/// Implementations report changes by handing [`ProximityEntry`] values to
/// [`LazyLoadObserver::handle_entries`](super::LazyLoadObserver::handle_entries),
/// on whatever cadence the host provides.
pub trait ProximityWatcher: Send + Sync {
    /// Start watching `element` with the given lookahead margin in pixels.
    fn watch(&self, element: ElementId, margin: f64) -> Result<(), WatchError>;

    /// Stop watching `element`. Unknown elements are ignored.
    fn unwatch(&self, element: ElementId);

    /// Stop watching everything.
    fn disconnect(&self);
}

/// Watcher for hosts with no proximity capability.
///
/// Every `watch` fails, which makes the observer load eagerly.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedWatcher;

impl ProximityWatcher for UnsupportedWatcher {
    fn watch(&self, _element: ElementId, _margin: f64) -> Result<(), WatchError> {
        Err(WatchError::Unsupported)
    }

    fn unwatch(&self, _element: ElementId) {}

    fn disconnect(&self) {}
}

struct Watched {
    margin: f64,
    rect: Option<Rect>,
}

/// Watcher driven by manual scroll-position polling.
///
/// The host reports element layout with [`PollingWatcher::set_rect`] and calls
/// [`PollingWatcher::poll`] with the current viewport whenever it scrolls or
/// resizes. Elements without a known rect are not reported.
#[derive(Default)]
pub struct PollingWatcher {
    watched: Mutex<HashMap<ElementId, Watched>>,
    layout: Mutex<HashMap<ElementId, Rect>>,
}

impl PollingWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the layout rectangle of an element (watched or not yet watched).
    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        lock(&self.layout).insert(element, rect);
        if let Some(w) = lock(&self.watched).get_mut(&element) {
            w.rect = Some(rect);
        }
    }

    /// Forget an element's layout, e.g. when it is removed from the page.
    pub fn remove_rect(&self, element: ElementId) {
        lock(&self.layout).remove(&element);
        if let Some(w) = lock(&self.watched).get_mut(&element) {
            w.rect = None;
        }
    }

    /// Proximity entries for every watched element with a known rect,
    /// in element order.
    pub fn poll(&self, viewport: Rect) -> Vec<ProximityEntry> {
        let mut entries: Vec<ProximityEntry> = lock(&self.watched)
            .iter()
            .filter_map(|(element, w)| {
                w.rect.map(|rect| ProximityEntry {
                    element: *element,
                    is_near: rect.is_near(&viewport, w.margin),
                })
            })
            .collect();
        entries.sort_by_key(|e| e.element);
        entries
    }

    pub fn watched_count(&self) -> usize {
        lock(&self.watched).len()
    }
}

impl ProximityWatcher for PollingWatcher {
    fn watch(&self, element: ElementId, margin: f64) -> Result<(), WatchError> {
        if !margin.is_finite() || margin < 0.0 {
            return Err(WatchError::Rejected(
                element,
                format!("invalid margin {margin}"),
            ));
        }
        let rect = lock(&self.layout).get(&element).copied();
        lock(&self.watched).insert(element, Watched { margin, rect });
        Ok(())
    }

    fn unwatch(&self, element: ElementId) {
        lock(&self.watched).remove(&element);
    }

    fn disconnect(&self) {
        lock(&self.watched).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(scroll_y: f64) -> Rect {
        Rect::new(0.0, scroll_y, 1024.0, 768.0)
    }

    #[test]
    fn test_poll_reports_near_and_far() {
        let watcher = PollingWatcher::new();
        watcher.set_rect(ElementId(1), Rect::new(0.0, 100.0, 300.0, 200.0));
        watcher.set_rect(ElementId(2), Rect::new(0.0, 5000.0, 300.0, 200.0));
        watcher.watch(ElementId(1), 500.0).unwrap();
        watcher.watch(ElementId(2), 500.0).unwrap();

        let entries = watcher.poll(viewport(0.0));
        assert_eq!(
            entries,
            vec![
                ProximityEntry {
                    element: ElementId(1),
                    is_near: true
                },
                ProximityEntry {
                    element: ElementId(2),
                    is_near: false
                },
            ]
        );

        let entries = watcher.poll(viewport(4000.0));
        assert!(entries[1].is_near);
    }

    #[test]
    fn test_poll_skips_unwatched_and_unplaced() {
        let watcher = PollingWatcher::new();
        watcher.watch(ElementId(1), 0.0).unwrap();
        assert!(watcher.poll(viewport(0.0)).is_empty());

        watcher.set_rect(ElementId(1), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(watcher.poll(viewport(0.0)).len(), 1);

        watcher.unwatch(ElementId(1));
        assert!(watcher.poll(viewport(0.0)).is_empty());
    }

    #[test]
    fn test_disconnect_clears_everything() {
        let watcher = PollingWatcher::new();
        for id in 0..5 {
            watcher.watch(ElementId(id), 100.0).unwrap();
        }
        assert_eq!(watcher.watched_count(), 5);
        watcher.disconnect();
        assert_eq!(watcher.watched_count(), 0);
    }

    #[test]
    fn test_rejects_negative_margin() {
        let watcher = PollingWatcher::new();
        let err = watcher.watch(ElementId(3), -5.0).unwrap_err();
        assert!(matches!(err, WatchError::Rejected(ElementId(3), _)));
    }

    #[test]
    fn test_unsupported_watcher_always_fails() {
        assert_eq!(
            UnsupportedWatcher.watch(ElementId(1), 10.0),
            Err(WatchError::Unsupported)
        );
    }
}
