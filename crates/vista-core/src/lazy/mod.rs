//! Viewport-triggered deferred image loading.
//!
//! - **geometry**: rectangles and margin-expanded intersection
//! - **surface**: the rendering surface that receives attribute swaps
//! - **watcher**: the host's proximity primitive, plus a polling implementation
//! - **observer**: per-element registration with at-most-once triggering

pub mod geometry;
pub mod observer;
pub mod surface;
pub mod watcher;

pub use geometry::Rect;
pub use observer::LazyLoadObserver;
pub use surface::{ElementId, MemorySurface, RenderSurface};
pub use watcher::{PollingWatcher, ProximityEntry, ProximityWatcher, UnsupportedWatcher, WatchError};
