//! Generation-tagged catalog fetching.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;

use super::source::PhotoSource;
use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::store::{Action, Store};
use crate::types::Photo;

/// Fetch behavior knobs.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Upper bound on a single retrieval
    pub timeout: Duration,
    /// Tag thumbnail URLs with the fetch timestamp
    pub cache_bust: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&SourceConfig::default())
    }
}

impl From<&SourceConfig> for FetchOptions {
    fn from(config: &SourceConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            cache_bust: config.cache_bust,
        }
    }
}

/// What became of a single fetch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The catalog was published to the store
    Applied { count: usize },
    /// `FETCH_ERROR` was published with this reason
    Failed { reason: String },
    /// A newer fetch was issued first; the result was dropped
    Superseded,
}

/// Drives a [`PhotoSource`] and publishes results into the [`Store`].
///
/// Each call to [`PhotoFetcher::fetch`] takes a new generation. Only the
/// latest generation may publish: the generation check runs inside the
/// store's dispatch cycle, so a stale result can never land after a newer
/// fetch's `FETCH_START`. No lock is held while dispatching, so store
/// listeners may call back into the fetcher, e.g. to retry on error.
#[derive(Clone)]
pub struct PhotoFetcher {
    store: Store,
    source: Arc<dyn PhotoSource>,
    options: FetchOptions,
    latest: Arc<AtomicU64>,
}

impl PhotoFetcher {
    pub fn new(store: Store, source: Arc<dyn PhotoSource>, options: FetchOptions) -> Self {
        Self {
            store,
            source,
            options,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Generation of the most recently issued fetch (0 before the first).
    pub fn generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Issue one asynchronous catalog retrieval.
    ///
    /// Must be called within a Tokio runtime. The returned handle may be
    /// awaited or ignored.
    pub fn fetch(&self) -> JoinHandle<FetchOutcome> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.store
            .dispatch_if(Action::FetchStart, || self.is_current(generation));
        tracing::debug!(
            "Fetch #{} started from {} source",
            generation,
            self.source.name()
        );

        let this = self.clone();
        tokio::spawn(async move {
            let result = this.retrieve().await;
            this.publish(generation, result)
        })
    }

    fn is_current(&self, generation: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == generation
    }

    async fn retrieve(&self) -> Result<Vec<Photo>, FetchError> {
        let records = tokio::time::timeout(self.options.timeout, self.source.fetch_catalog())
            .await
            .map_err(|_| FetchError::Timeout {
                timeout_ms: self.options.timeout.as_millis() as u64,
            })??;

        let stamp = self.options.cache_bust.then(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default()
        });
        Ok(records.into_iter().map(|r| r.into_photo(stamp)).collect())
    }

    fn publish(&self, generation: u64, result: Result<Vec<Photo>, FetchError>) -> FetchOutcome {
        let (action, outcome) = match result {
            Ok(photos) => {
                let count = photos.len();
                (Action::FetchSuccess(photos), FetchOutcome::Applied { count })
            }
            Err(e) => {
                let reason = e.reason();
                tracing::debug!("Catalog fetch #{} returned error: {}", generation, e);
                (
                    Action::FetchError(reason.clone()),
                    FetchOutcome::Failed { reason },
                )
            }
        };

        if self
            .store
            .dispatch_if(action, || self.is_current(generation))
            .is_none()
        {
            tracing::debug!(
                "Discarding fetch #{} (superseded by #{})",
                generation,
                self.generation()
            );
            return FetchOutcome::Superseded;
        }

        match &outcome {
            FetchOutcome::Applied { count } => {
                tracing::info!("Loaded {} photos (fetch #{})", count, generation)
            }
            FetchOutcome::Failed { reason } => {
                tracing::error!("Catalog fetch #{} failed: {}", generation, reason)
            }
            FetchOutcome::Superseded => {}
        }
        outcome
    }
}
