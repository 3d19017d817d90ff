//! Single source of truth for gallery and modal state.
//!
//! Components never touch state directly: they send an [`Action`] through
//! [`Store::dispatch`], which applies the pure [`reduce`] function and then
//! notifies subscribers with the resulting snapshot. Whole dispatch cycles are
//! serialized across threads. Readers only ever see `Arc<AppState>`
//! snapshots, which are never mutated.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::thread::{self, ThreadId};

use crate::config::Config;
use crate::types::{AppState, GalleryState, LoadingStatus, ModalState, Photo, Rgb, ALL_CATEGORY};

/// Every state transition the store understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    FetchStart,
    FetchSuccess(Vec<Photo>),
    FetchError(String),
    SetCategory(String),
    OpenModal(Photo),
    SetModalColor(Rgb),
    CloseModal,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::FetchStart => "FETCH_START",
            Action::FetchSuccess(_) => "FETCH_SUCCESS",
            Action::FetchError(_) => "FETCH_ERROR",
            Action::SetCategory(_) => "SET_CATEGORY",
            Action::OpenModal(_) => "OPEN_MODAL",
            Action::SetModalColor(_) => "SET_MODAL_COLOR",
            Action::CloseModal => "CLOSE_MODAL",
        }
    }
}

/// Static inputs the reducer needs besides state and action.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducerRules {
    /// Categories `SET_CATEGORY` may select, including `"all"`
    pub known_categories: Vec<String>,
    /// Background shown while the modal color is still being computed
    pub placeholder_color: Rgb,
}

impl Default for ReducerRules {
    fn default() -> Self {
        Self {
            known_categories: vec![ALL_CATEGORY.to_string()],
            placeholder_color: Rgb::NEUTRAL,
        }
    }
}

impl ReducerRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            known_categories: config.known_categories(),
            placeholder_color: config.color.fallback,
        }
    }
}

/// Pure transition function: `(state, action) -> state`.
pub fn reduce(state: &AppState, action: Action, rules: &ReducerRules) -> AppState {
    match action {
        Action::FetchStart => AppState {
            gallery: GalleryState {
                loading_status: LoadingStatus::Pending,
                ..state.gallery.clone()
            },
            modal: state.modal.clone(),
        },
        Action::FetchSuccess(photos) => AppState {
            gallery: GalleryState {
                photos: Arc::new(photos),
                loading_status: LoadingStatus::Done,
                category: state.gallery.category.clone(),
            },
            modal: state.modal.clone(),
        },
        Action::FetchError(reason) => AppState {
            gallery: GalleryState {
                loading_status: LoadingStatus::Error(reason),
                ..state.gallery.clone()
            },
            modal: state.modal.clone(),
        },
        Action::SetCategory(category) => {
            if !rules.known_categories.contains(&category) {
                tracing::warn!("Ignoring unknown category '{}'", category);
                return state.clone();
            }
            AppState {
                gallery: GalleryState {
                    category,
                    ..state.gallery.clone()
                },
                modal: state.modal.clone(),
            }
        }
        Action::OpenModal(photo) => AppState {
            gallery: state.gallery.clone(),
            modal: ModalState {
                visible: true,
                src: Some(photo.full_url),
                alt_text: Some(photo.alt_text),
                bg_color: Some(rules.placeholder_color),
            },
        },
        Action::SetModalColor(color) => {
            if !state.modal.visible {
                tracing::debug!("Ignoring modal color {} while modal is closed", color);
                return state.clone();
            }
            AppState {
                gallery: state.gallery.clone(),
                modal: ModalState {
                    bg_color: Some(color),
                    ..state.modal.clone()
                },
            }
        }
        Action::CloseModal => AppState {
            gallery: state.gallery.clone(),
            modal: ModalState::default(),
        },
    }
}

type Listener = Arc<dyn Fn(&Arc<AppState>) + Send + Sync>;

struct StoreInner {
    rules: ReducerRules,
    state: Mutex<Arc<AppState>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    /// Held for a whole reduce-and-notify cycle
    cycle: Mutex<()>,
    /// Thread currently running a cycle
    owner: Mutex<Option<ThreadId>>,
    /// Snapshots produced by listeners during the current cycle
    deferred: Mutex<VecDeque<Arc<AppState>>>,
}

/// Marks the current thread as running a dispatch cycle until dropped.
struct CycleOwner<'a> {
    inner: &'a StoreInner,
}

impl<'a> CycleOwner<'a> {
    fn enter(inner: &'a StoreInner) -> Self {
        *lock(&inner.owner) = Some(thread::current().id());
        Self { inner }
    }
}

impl Drop for CycleOwner<'_> {
    fn drop(&mut self) {
        lock(&self.inner.deferred).clear();
        *lock(&self.inner.owner) = None;
    }
}

/// Shared handle to the application state. Cloning is cheap.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Create a store with empty initial state.
    pub fn new(rules: ReducerRules) -> Self {
        Self::with_state(rules, AppState::default())
    }

    /// Create a store starting from a given state.
    pub fn with_state(rules: ReducerRules, state: AppState) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                rules,
                state: Mutex::new(Arc::new(state)),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                cycle: Mutex::new(()),
                owner: Mutex::new(None),
                deferred: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Create a store from configuration, honoring `gallery.default_category`.
    pub fn from_config(config: &Config) -> Self {
        let state = AppState {
            gallery: GalleryState {
                category: config.gallery.default_category.clone(),
                ..GalleryState::default()
            },
            modal: ModalState::default(),
        };
        Self::with_state(ReducerRules::from_config(config), state)
    }

    /// Current snapshot.
    pub fn get_state(&self) -> Arc<AppState> {
        lock(&self.inner.state).clone()
    }

    /// Apply an action and notify subscribers. Returns the snapshot the
    /// action produced.
    ///
    /// Reduce-and-notify cycles are serialized: every listener sees every
    /// snapshot in the order the store produced them, and the last snapshot a
    /// listener receives is the store's current state. Listeners may
    /// dispatch; such nested actions are reduced immediately and delivered
    /// after the current round of notifications.
    pub fn dispatch(&self, action: Action) -> Arc<AppState> {
        self.dispatch_if(action, || true)
            .unwrap_or_else(|| self.get_state())
    }

    /// Dispatch `action` only if `still_current` holds at the moment the
    /// action would be reduced. Returns `None` when the action was dropped.
    ///
    /// `still_current` runs inside the dispatch cycle, so no other action can
    /// be reduced between the check and the reduction.
    pub fn dispatch_if<F>(&self, action: Action, still_current: F) -> Option<Arc<AppState>>
    where
        F: FnOnce() -> bool,
    {
        let inner = &self.inner;
        if *lock(&inner.owner) == Some(thread::current().id()) {
            // Called from a listener: the outer cycle delivers this snapshot
            if !still_current() {
                return None;
            }
            let next = self.apply(action);
            lock(&inner.deferred).push_back(next.clone());
            return Some(next);
        }

        let _cycle = lock(&inner.cycle);
        if !still_current() {
            return None;
        }
        let _owner = CycleOwner::enter(inner);
        let next = self.apply(action);

        let mut snapshot = next.clone();
        loop {
            self.notify(&snapshot);
            match lock(&inner.deferred).pop_front() {
                Some(deferred) => snapshot = deferred,
                None => break,
            }
        }
        Some(next)
    }

    fn apply(&self, action: Action) -> Arc<AppState> {
        let name = action.name();
        let next = {
            let mut current = lock(&self.inner.state);
            let next = Arc::new(reduce(&current, action, &self.inner.rules));
            *current = next.clone();
            next
        };
        tracing::trace!("Dispatched {}", name);
        next
    }

    fn notify(&self, snapshot: &Arc<AppState>) {
        let listeners: Vec<Listener> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    /// Register a listener called with each new snapshot.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<AppState>) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.listeners).push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.listeners).len()
    }
}

/// Handle returned by [`Store::subscribe`].
///
/// The listener stays registered until [`Subscription::unsubscribe`] is called.
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    /// Remove the listener. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.store.upgrade() {
            lock(&inner.listeners).retain(|(id, _)| *id != self.id);
        }
    }
}

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str, category: &str) -> Photo {
        Photo {
            id: id.to_string(),
            thumbnail_url: format!("https://img.test/{id}?w=400"),
            full_url: format!("https://img.test/{id}?w=1600"),
            alt_text: format!("photo {id}"),
            category: category.to_string(),
            thumbnail_srcset: None,
        }
    }

    fn rules() -> ReducerRules {
        ReducerRules {
            known_categories: vec!["all".into(), "food".into(), "travel".into()],
            placeholder_color: Rgb::new(1, 2, 3),
        }
    }

    #[test]
    fn test_fetch_lifecycle() {
        let store = Store::new(rules());
        assert_eq!(store.dispatch(Action::FetchStart).gallery.loading_status, LoadingStatus::Pending);

        let state = store.dispatch(Action::FetchSuccess(vec![photo("a", "food")]));
        assert_eq!(state.gallery.loading_status, LoadingStatus::Done);
        assert_eq!(state.gallery.photos.len(), 1);

        let state = store.dispatch(Action::FetchError("network".into()));
        assert_eq!(
            state.gallery.loading_status,
            LoadingStatus::Error("network".into())
        );
        // A failed refetch keeps the last good catalog
        assert_eq!(state.gallery.photos.len(), 1);
    }

    #[test]
    fn test_fetch_success_replaces_wholesale() {
        let store = Store::new(rules());
        store.dispatch(Action::FetchSuccess(vec![photo("a", "food"), photo("b", "food")]));
        let state = store.dispatch(Action::FetchSuccess(vec![photo("c", "travel")]));
        let ids: Vec<&str> = state.gallery.photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c"]);
    }

    #[test]
    fn test_set_category_rejects_unknown() {
        let store = Store::new(rules());
        assert_eq!(store.dispatch(Action::SetCategory("food".into())).gallery.category, "food");
        assert_eq!(store.dispatch(Action::SetCategory("cars".into())).gallery.category, "food");
    }

    #[test]
    fn test_open_modal_sets_placeholder_color() {
        let store = Store::new(rules());
        let state = store.dispatch(Action::OpenModal(photo("a", "food")));
        assert!(state.modal.visible);
        assert_eq!(state.modal.src.as_deref(), Some("https://img.test/a?w=1600"));
        assert_eq!(state.modal.alt_text.as_deref(), Some("photo a"));
        assert_eq!(state.modal.bg_color, Some(Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_modal_color_ignored_when_closed() {
        let store = Store::new(rules());
        let state = store.dispatch(Action::SetModalColor(Rgb::new(9, 9, 9)));
        assert_eq!(state.modal, ModalState::default());
    }

    #[test]
    fn test_close_modal_resets_everything() {
        let store = Store::new(rules());
        store.dispatch(Action::OpenModal(photo("a", "food")));
        store.dispatch(Action::SetModalColor(Rgb::new(9, 9, 9)));
        let state = store.dispatch(Action::CloseModal);
        assert_eq!(state.modal, ModalState::default());
    }

    #[test]
    fn test_previous_snapshots_are_untouched() {
        let store = Store::new(rules());
        let before = store.get_state();
        store.dispatch(Action::FetchStart);
        assert_eq!(before.gallery.loading_status, LoadingStatus::Idle);
        assert_eq!(store.get_state().gallery.loading_status, LoadingStatus::Pending);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let store = Store::new(rules());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(move |state| {
            sink.lock().unwrap().push(state.gallery.loading_status.clone());
        });

        store.dispatch(Action::FetchStart);
        store.dispatch(Action::FetchError("timeout".into()));
        sub.unsubscribe();
        sub.unsubscribe();
        store.dispatch(Action::FetchStart);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                LoadingStatus::Pending,
                LoadingStatus::Error("timeout".into())
            ]
        );
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_listener_may_dispatch() {
        let store = Store::new(rules());
        let inner = store.clone();
        let _sub = store.subscribe(move |state| {
            if state.gallery.loading_status == LoadingStatus::Pending {
                inner.dispatch(Action::FetchSuccess(Vec::new()));
            }
        });
        store.dispatch(Action::FetchStart);
        assert_eq!(store.get_state().gallery.loading_status, LoadingStatus::Done);
    }

    #[test]
    fn test_nested_dispatch_reaches_other_listeners_in_order() {
        let store = Store::new(rules());
        let inner = store.clone();
        let _redispatch = store.subscribe(move |state| {
            if state.gallery.loading_status == LoadingStatus::Pending {
                inner.dispatch(Action::FetchSuccess(Vec::new()));
            }
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _recorder = store.subscribe(move |state| {
            sink.lock().unwrap().push(state.clone());
        });

        let returned = store.dispatch(Action::FetchStart);
        assert_eq!(returned.gallery.loading_status, LoadingStatus::Pending);

        let seen = seen.lock().unwrap();
        let statuses: Vec<_> = seen.iter().map(|s| s.gallery.loading_status.clone()).collect();
        assert_eq!(statuses, vec![LoadingStatus::Pending, LoadingStatus::Done]);
        assert!(Arc::ptr_eq(seen.last().unwrap(), &store.get_state()));
    }

    #[test]
    fn test_concurrent_dispatches_deliver_latest_state_last() {
        let store = Store::new(rules());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = store.subscribe(move |state| {
            sink.lock().unwrap().push(state.clone());
        });

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        store.dispatch(Action::FetchError(format!("{i}-{j}")));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 400);
        assert!(Arc::ptr_eq(seen.last().unwrap(), &store.get_state()));
    }

    #[test]
    fn test_dispatch_if_drops_action_when_not_current() {
        let store = Store::new(rules());
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        assert!(store.dispatch_if(Action::FetchStart, || false).is_none());
        assert_eq!(store.get_state().gallery.loading_status, LoadingStatus::Idle);
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        let state = store.dispatch_if(Action::FetchStart, || true).unwrap();
        assert_eq!(state.gallery.loading_status, LoadingStatus::Pending);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_from_config_uses_default_category() {
        let mut config = Config::default();
        config.gallery.default_category = "food".into();
        let store = Store::from_config(&config);
        assert_eq!(store.get_state().gallery.category, "food");
    }
}
