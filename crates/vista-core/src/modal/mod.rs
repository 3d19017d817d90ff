//! Modal overlay controller.
//!
//! ```text
//!            open(photo)                 colorReady
//! Closed ───────────────▶ ComputingColor ──────────▶ Open
//!   ▲                        │   ▲  open(other)        │
//!   │                        │   └─────────────────────┤
//!   └──────── close ─────────┴─────────────────────────┘
//! ```
//!
//! Every open takes a new generation; a sampled color is applied only if its
//! generation is still current, so a slow sample for an earlier photo can
//! never tint a later one.

mod loader;

pub use loader::{HttpImageLoader, ImageLoader};

use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

use crate::color::{ColorSampler, PixelSource};
use crate::error::LoadError;
use crate::lazy::{ElementId, RenderSurface};
use crate::store::{lock, Action, Store};
use crate::types::{Photo, Rgb};

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPhase {
    #[default]
    Closed,
    ComputingColor,
    Open,
}

#[derive(Default)]
struct Progress {
    phase: ModalPhase,
    generation: u64,
}

struct ModalInner {
    store: Store,
    sampler: ColorSampler,
    loader: Arc<dyn ImageLoader>,
    overlay: Option<(Arc<dyn RenderSurface>, ElementId)>,
    progress: Mutex<Progress>,
}

/// Coordinates modal open/close and background color computation.
///
/// Cloning yields another handle to the same controller. Generation checks
/// run inside the store's dispatch cycle and no controller lock is held while
/// listeners run, so listeners may query or close the controller.
#[derive(Clone)]
pub struct ModalController {
    inner: Arc<ModalInner>,
}

impl ModalController {
    pub fn new(store: Store, sampler: ColorSampler, loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            inner: Arc::new(ModalInner {
                store,
                sampler,
                loader,
                overlay: None,
                progress: Mutex::new(Progress::default()),
            }),
        }
    }

    /// Also toggle `overlay`'s visibility on `surface` as the modal opens and closes.
    pub fn with_overlay(
        store: Store,
        sampler: ColorSampler,
        loader: Arc<dyn ImageLoader>,
        surface: Arc<dyn RenderSurface>,
        overlay: ElementId,
    ) -> Self {
        Self {
            inner: Arc::new(ModalInner {
                store,
                sampler,
                loader,
                overlay: Some((surface, overlay)),
                progress: Mutex::new(Progress::default()),
            }),
        }
    }

    pub fn phase(&self) -> ModalPhase {
        lock(&self.inner.progress).phase
    }

    /// Generation of the latest open or close.
    pub fn generation(&self) -> u64 {
        lock(&self.inner.progress).generation
    }

    /// Open the modal for `photo`, sampling its thumbnail via the loader.
    ///
    /// The handle resolves to the applied color, or `None` if this request
    /// was superseded. A thumbnail that fails to load still opens the modal
    /// with the fallback color.
    pub fn open(&self, photo: Photo) -> JoinHandle<Option<Rgb>> {
        let thumbnail_url = photo.thumbnail_url.clone();
        let generation = self.begin(photo);

        let this = self.clone();
        tokio::spawn(async move {
            let color = match this.inner.loader.load(&thumbnail_url).await {
                Ok(pixels) => this.inner.sampler.sample_async(pixels).await,
                Err(e) => {
                    tracing::warn!("Thumbnail unavailable for sampling: {}", e);
                    this.inner.sampler.fallback()
                }
            };
            this.finish(generation, color)
        })
    }

    /// Open the modal for `photo` using thumbnail pixels the host already holds.
    pub fn open_with_image(
        &self,
        photo: Photo,
        thumbnail: Arc<dyn PixelSource>,
    ) -> JoinHandle<Option<Rgb>> {
        let generation = self.begin(photo);

        let this = self.clone();
        tokio::spawn(async move {
            let color = this.inner.sampler.sample_async(thumbnail).await;
            this.finish(generation, color)
        })
    }

    /// Close the modal from any phase and reset the modal state.
    pub fn close(&self) {
        let generation = {
            let mut progress = lock(&self.inner.progress);
            progress.generation += 1;
            progress.phase = ModalPhase::Closed;
            progress.generation
        };
        let closed = self
            .inner
            .store
            .dispatch_if(Action::CloseModal, || self.show_overlay_if_current(generation, false));
        if closed.is_some() {
            tracing::debug!("Modal closed (generation {})", generation);
        }
    }

    /// Warm the loader with the full-size image so a later open shows it at once.
    pub fn prefetch(&self, photo: &Photo) -> JoinHandle<()> {
        let loader = self.inner.loader.clone();
        let url = photo.full_url.clone();
        tokio::spawn(async move { loader.prefetch(&url).await })
    }

    /// Whether the full-size image of `photo` is already held by the loader.
    pub fn is_prefetched(&self, photo: &Photo) -> bool {
        self.inner.loader.is_cached(&photo.full_url)
    }

    /// Full-size image of `photo`, served from the loader's cache when prefetched.
    pub async fn full_image(&self, photo: &Photo) -> Result<Arc<dyn PixelSource>, LoadError> {
        self.inner.loader.load(&photo.full_url).await
    }

    fn begin(&self, photo: Photo) -> u64 {
        let generation = {
            let mut progress = lock(&self.inner.progress);
            progress.generation += 1;
            if progress.phase == ModalPhase::ComputingColor {
                tracing::debug!(
                    "Open of {} supersedes pending sample (generation {})",
                    photo.id,
                    progress.generation
                );
            }
            progress.phase = ModalPhase::ComputingColor;
            progress.generation
        };
        self.inner
            .store
            .dispatch_if(Action::OpenModal(photo), || {
                self.show_overlay_if_current(generation, true)
            });
        generation
    }

    fn finish(&self, generation: u64, color: Rgb) -> Option<Rgb> {
        let applied = self.inner.store.dispatch_if(Action::SetModalColor(color), || {
            let mut progress = lock(&self.inner.progress);
            if progress.generation != generation || progress.phase != ModalPhase::ComputingColor {
                return false;
            }
            progress.phase = ModalPhase::Open;
            true
        });
        if applied.is_none() {
            tracing::debug!(
                "Discarding color {} from generation {} (current {})",
                color,
                generation,
                self.generation()
            );
            return None;
        }
        Some(color)
    }

    /// Toggle the overlay when `generation` is still the latest transition.
    fn show_overlay_if_current(&self, generation: u64, visible: bool) -> bool {
        if self.generation() != generation {
            return false;
        }
        if let Some((surface, element)) = &self.inner.overlay {
            surface.set_visible(*element, visible);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::loader::test_server::serve_png;
    use crate::color::RestrictedImage;
    use crate::config::LoaderConfig;
    use crate::lazy::MemorySurface;
    use crate::store::ReducerRules;
    use crate::types::ModalState;
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use tokio::sync::oneshot;

    type Gate = oneshot::Receiver<Result<Arc<dyn PixelSource>, LoadError>>;

    /// Loader whose responses are released manually per URL.
    #[derive(Default)]
    struct GatedLoader {
        gates: Mutex<HashMap<String, Gate>>,
        prefetched: Mutex<Vec<String>>,
    }

    impl GatedLoader {
        fn gate(
            &self,
            url: &str,
        ) -> oneshot::Sender<Result<Arc<dyn PixelSource>, LoadError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(url.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl ImageLoader for GatedLoader {
        async fn load(&self, url: &str) -> Result<Arc<dyn PixelSource>, LoadError> {
            let gate = self.gates.lock().unwrap().remove(url).expect("ungated url");
            gate.await.expect("gate dropped")
        }

        async fn prefetch(&self, url: &str) {
            self.prefetched.lock().unwrap().push(url.to_string());
        }
    }

    fn photo(id: &str) -> Photo {
        Photo {
            id: id.to_string(),
            thumbnail_url: format!("thumb/{id}"),
            full_url: format!("full/{id}"),
            alt_text: format!("alt {id}"),
            category: "food".to_string(),
            thumbnail_srcset: None,
        }
    }

    fn solid(r: u8, g: u8, b: u8) -> Arc<dyn PixelSource> {
        Arc::new(RgbaImage::from_pixel(8, 8, Rgba([r, g, b, 255])))
    }

    fn setup() -> (ModalController, Store, Arc<GatedLoader>) {
        let store = Store::new(ReducerRules::default());
        let loader = Arc::new(GatedLoader::default());
        let controller = ModalController::new(store.clone(), ColorSampler::default(), loader.clone());
        (controller, store, loader)
    }

    #[tokio::test]
    async fn test_open_computes_color() {
        let (controller, store, loader) = setup();
        let gate = loader.gate("thumb/a");

        let handle = controller.open(photo("a"));
        assert_eq!(controller.phase(), ModalPhase::ComputingColor);
        let state = store.get_state();
        assert!(state.modal.visible);
        assert_eq!(state.modal.src.as_deref(), Some("full/a"));
        assert_eq!(state.modal.bg_color, Some(Rgb::NEUTRAL));

        gate.send(Ok(solid(10, 20, 30))).ok();
        assert_eq!(handle.await.unwrap(), Some(Rgb::new(10, 20, 30)));
        assert_eq!(controller.phase(), ModalPhase::Open);
        assert_eq!(store.get_state().modal.bg_color, Some(Rgb::new(10, 20, 30)));
    }

    #[tokio::test]
    async fn test_reopen_supersedes_pending_sample() {
        let (controller, store, loader) = setup();
        let gate_a = loader.gate("thumb/a");
        let gate_b = loader.gate("thumb/b");

        let a = controller.open(photo("a"));
        let b = controller.open(photo("b"));

        // A resolves first but must be discarded
        gate_a.send(Ok(solid(200, 0, 0))).ok();
        assert_eq!(a.await.unwrap(), None);
        assert_eq!(store.get_state().modal.bg_color, Some(Rgb::NEUTRAL));
        assert_eq!(controller.phase(), ModalPhase::ComputingColor);

        gate_b.send(Ok(solid(0, 0, 200))).ok();
        assert_eq!(b.await.unwrap(), Some(Rgb::new(0, 0, 200)));

        let modal = store.get_state().modal.clone();
        assert_eq!(modal.src.as_deref(), Some("full/b"));
        assert_eq!(modal.alt_text.as_deref(), Some("alt b"));
        assert_eq!(modal.bg_color, Some(Rgb::new(0, 0, 200)));
    }

    #[tokio::test]
    async fn test_reopen_with_late_earlier_sample() {
        let (controller, store, loader) = setup();
        let gate_a = loader.gate("thumb/a");
        let gate_b = loader.gate("thumb/b");

        let a = controller.open(photo("a"));
        let b = controller.open(photo("b"));
        gate_b.send(Ok(solid(0, 0, 200))).ok();
        b.await.unwrap();
        gate_a.send(Ok(solid(200, 0, 0))).ok();
        assert_eq!(a.await.unwrap(), None);

        let modal = store.get_state().modal.clone();
        assert_eq!(modal.src.as_deref(), Some("full/b"));
        assert_eq!(modal.bg_color, Some(Rgb::new(0, 0, 200)));
    }

    #[tokio::test]
    async fn test_open_from_open_restarts() {
        let (controller, store, _loader) = setup();
        controller
            .open_with_image(photo("a"), solid(1, 2, 3))
            .await
            .unwrap();
        assert_eq!(controller.phase(), ModalPhase::Open);

        let handle = controller.open_with_image(photo("b"), solid(4, 5, 6));
        assert_eq!(controller.phase(), ModalPhase::ComputingColor);
        assert_eq!(store.get_state().modal.bg_color, Some(Rgb::NEUTRAL));
        assert_eq!(handle.await.unwrap(), Some(Rgb::new(4, 5, 6)));
        assert_eq!(store.get_state().modal.src.as_deref(), Some("full/b"));
    }

    #[tokio::test]
    async fn test_close_while_computing_resets_and_discards() {
        let (controller, store, loader) = setup();
        let gate = loader.gate("thumb/a");
        let handle = controller.open(photo("a"));

        controller.close();
        assert_eq!(store.get_state().modal, ModalState::default());
        assert_eq!(controller.phase(), ModalPhase::Closed);

        gate.send(Ok(solid(9, 9, 9))).ok();
        assert_eq!(handle.await.unwrap(), None);
        assert_eq!(store.get_state().modal, ModalState::default());
    }

    #[tokio::test]
    async fn test_close_from_open_resets() {
        let (controller, store, _loader) = setup();
        controller
            .open_with_image(photo("a"), solid(1, 2, 3))
            .await
            .unwrap();
        controller.close();
        let modal = store.get_state().modal.clone();
        assert!(!modal.visible);
        assert!(modal.src.is_none());
        assert!(modal.alt_text.is_none());
        assert!(modal.bg_color.is_none());
    }

    #[tokio::test]
    async fn test_close_when_closed_is_harmless() {
        let (controller, store, _loader) = setup();
        controller.close();
        assert_eq!(controller.phase(), ModalPhase::Closed);
        assert_eq!(store.get_state().modal, ModalState::default());
    }

    #[tokio::test]
    async fn test_restricted_thumbnail_opens_with_fallback() {
        let (controller, store, loader) = setup();
        let gate = loader.gate("thumb/a");
        let handle = controller.open(photo("a"));
        let restricted: Arc<dyn PixelSource> = Arc::new(RestrictedImage {
            origin: "https://cdn.test".into(),
        });
        gate.send(Ok(restricted)).ok();

        assert_eq!(handle.await.unwrap(), Some(Rgb::NEUTRAL));
        assert_eq!(controller.phase(), ModalPhase::Open);
        assert!(store.get_state().modal.visible);
    }

    #[tokio::test]
    async fn test_failed_thumbnail_load_opens_with_fallback() {
        let (controller, _store, loader) = setup();
        let gate = loader.gate("thumb/a");
        let handle = controller.open(photo("a"));
        gate.send(Err(LoadError::Request {
            url: "thumb/a".into(),
            message: "HTTP 404".into(),
            status_code: Some(404),
        }))
        .ok();

        assert_eq!(handle.await.unwrap(), Some(Rgb::NEUTRAL));
        assert_eq!(controller.phase(), ModalPhase::Open);
    }

    #[tokio::test]
    async fn test_overlay_visibility_follows_modal() {
        let store = Store::new(ReducerRules::default());
        let surface = Arc::new(MemorySurface::new());
        let overlay = ElementId(99);
        let controller = ModalController::with_overlay(
            store,
            ColorSampler::default(),
            Arc::new(GatedLoader::default()),
            surface.clone(),
            overlay,
        );

        controller
            .open_with_image(photo("a"), solid(1, 1, 1))
            .await
            .unwrap();
        assert!(surface.is_visible(overlay));
        controller.close();
        assert!(!surface.is_visible(overlay));
    }

    #[tokio::test]
    async fn test_prefetch_uses_full_url() {
        let (controller, _store, loader) = setup();
        controller.prefetch(&photo("a")).await.unwrap();
        assert_eq!(*loader.prefetched.lock().unwrap(), vec!["full/a".to_string()]);
    }

    #[tokio::test]
    async fn test_listener_reads_phase_during_open() {
        let (controller, store, loader) = setup();
        let phases = Arc::new(Mutex::new(Vec::new()));
        let (watching, sink) = (controller.clone(), phases.clone());
        let _sub = store.subscribe(move |_| sink.lock().unwrap().push(watching.phase()));

        let gate = loader.gate("thumb/a");
        let handle = controller.open(photo("a"));
        gate.send(Ok(solid(10, 20, 30))).ok();
        handle.await.unwrap();

        assert_eq!(
            *phases.lock().unwrap(),
            vec![ModalPhase::ComputingColor, ModalPhase::Open]
        );
    }

    #[tokio::test]
    async fn test_listener_may_close_when_color_arrives() {
        let (controller, store, _loader) = setup();
        let closer = controller.clone();
        let _sub = store.subscribe(move |state| {
            if state.modal.bg_color == Some(Rgb::new(10, 20, 30)) {
                closer.close();
            }
        });

        let applied = controller
            .open_with_image(photo("a"), solid(10, 20, 30))
            .await
            .unwrap();
        assert_eq!(applied, Some(Rgb::new(10, 20, 30)));
        assert_eq!(controller.phase(), ModalPhase::Closed);
        assert_eq!(store.get_state().modal, ModalState::default());
    }

    #[tokio::test]
    async fn test_prefetched_full_image_is_served_from_cache() {
        let (base, hits) = serve_png([40, 50, 60]).await;
        let loader = Arc::new(HttpImageLoader::new(&LoaderConfig {
            timeout_ms: 5_000,
            cache_entries: 4,
        }));
        let controller = ModalController::new(
            Store::new(ReducerRules::default()),
            ColorSampler::default(),
            loader,
        );
        let mut p = photo("a");
        p.thumbnail_url = format!("{base}/thumb/a.png");
        p.full_url = format!("{base}/full/a.png");

        assert!(!controller.is_prefetched(&p));
        controller.prefetch(&p).await.unwrap();
        assert!(controller.is_prefetched(&p));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let full = controller.full_image(&p).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            ColorSampler::default().sample(full.as_ref()),
            Rgb::new(40, 50, 60)
        );

        // Opening samples the thumbnail, which is a separate request
        assert_eq!(controller.open(p).await.unwrap(), Some(Rgb::new(40, 50, 60)));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
