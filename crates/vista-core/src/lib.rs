//! Vista Core - state and synchronization logic for a lazy-loading photo gallery.
//!
//! Vista keeps the parts of a gallery that involve asynchronous races and
//! cleanup in one place: catalog fetching, category filtering, deferred
//! thumbnail loading, average-color sampling and the modal state machine.
//! Layout and styling belong to the host renderer.
//!
//! # Architecture
//!
//! ```text
//! PhotoFetcher → Store.photos → CategoryFilter → thumbnails
//!                                                   │
//!                      LazyLoadObserver ◀───────────┘ (register)
//!                                                   │ (click)
//!            ModalController → ColorSampler → Store.modal
//! ```
//!
//! Every component receives a [`Store`] handle; the store is the only shared
//! mutable state and is changed exclusively through [`Store::dispatch`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vista_core::{Config, MemorySurface, PollingWatcher, Vista};
//!
//! #[tokio::main]
//! async fn main() -> vista_core::Result<()> {
//!     let config = Config::load()?;
//!     let vista = Vista::from_config(
//!         config,
//!         Arc::new(PollingWatcher::new()),
//!         Arc::new(MemorySurface::new()),
//!     );
//!     vista.fetcher().fetch().await.ok();
//!     println!("{:?}", vista.view());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod color;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod lazy;
pub mod modal;
pub mod output;
pub mod store;
pub mod types;
pub mod view;

// Re-exports for convenient access
pub use color::{ColorSampler, PixelSource, RestrictedImage};
pub use config::Config;
pub use error::{ConfigError, FetchError, LoadError, Result, SampleError, VistaError};
pub use fetch::{FetchOptions, FetchOutcome, FilePhotoSource, HttpPhotoSource, PhotoFetcher, PhotoSource};
pub use filter::{filter, CategoryFilter};
pub use lazy::{
    ElementId, LazyLoadObserver, MemorySurface, PollingWatcher, ProximityEntry, ProximityWatcher,
    Rect, RenderSurface, UnsupportedWatcher,
};
pub use modal::{HttpImageLoader, ImageLoader, ModalController, ModalPhase};
pub use output::{CatalogWriter, ColorReport, OutputFormat};
pub use store::{Action, ReducerRules, Store, Subscription};
pub use types::{AppState, GalleryState, LoadingStatus, ModalState, Photo, Rgb, ALL_CATEGORY};
pub use view::GalleryView;

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A fully wired gallery: one store shared by every component.
pub struct Vista {
    config: Config,
    store: Store,
    fetcher: PhotoFetcher,
    filter: CategoryFilter,
    observer: LazyLoadObserver,
    modal: ModalController,
}

impl Vista {
    /// Wire a gallery from explicit collaborators.
    pub fn new(
        config: Config,
        source: Arc<dyn PhotoSource>,
        loader: Arc<dyn ImageLoader>,
        watcher: Arc<dyn ProximityWatcher>,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        tracing::debug!("Initializing Vista v{} with {} source", VERSION, source.name());
        let store = Store::from_config(&config);
        let fetcher = PhotoFetcher::new(
            store.clone(),
            source,
            FetchOptions::from(&config.source),
        );
        let observer = LazyLoadObserver::new(watcher, surface, &config.lazy_load);
        let modal = ModalController::new(store.clone(), ColorSampler::new(&config.color), loader);

        Self {
            config,
            store,
            fetcher,
            filter: CategoryFilter::new(),
            observer,
            modal,
        }
    }

    /// Wire a gallery using the configured catalog source and an HTTP image loader.
    ///
    /// A configured `source.catalog_path` takes precedence over `source.endpoint`.
    pub fn from_config(
        config: Config,
        watcher: Arc<dyn ProximityWatcher>,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        let source = Self::source_for(&config);
        let loader = Arc::new(HttpImageLoader::new(&config.loader));
        Self::new(config, source, loader, watcher, surface)
    }

    /// The catalog source selected by `config`.
    pub fn source_for(config: &Config) -> Arc<dyn PhotoSource> {
        match config.catalog_path() {
            Some(path) => Arc::new(FilePhotoSource::new(path)),
            None => Arc::new(HttpPhotoSource::from_config(&config.source)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn fetcher(&self) -> &PhotoFetcher {
        &self.fetcher
    }

    pub fn observer(&self) -> &LazyLoadObserver {
        &self.observer
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    /// Select a category. Unknown categories leave the selection unchanged.
    pub fn set_category(&self, category: &str) -> Arc<AppState> {
        self.store.dispatch(Action::SetCategory(category.to_string()))
    }

    /// Photos visible under the current category (memoized).
    pub fn visible_photos(&self) -> Arc<Vec<Photo>> {
        self.filter.visible(&self.store.get_state().gallery)
    }

    /// What the gallery area should currently show.
    pub fn view(&self) -> GalleryView {
        GalleryView::derive(&self.store.get_state().gallery, &self.filter)
    }

    /// Stop all proximity watching and close the modal.
    pub fn teardown(&self) {
        self.observer.disconnect_all();
        if self.modal.phase() != ModalPhase::Closed {
            self.modal.close();
        }
    }
}
