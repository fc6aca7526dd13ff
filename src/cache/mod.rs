//! Query cache: deduplicated, prefix-invalidated reads.
//!
//! DESIGN
//! ======
//! One `QueryCache` per process, cloned into every [`crate::DataContext`].
//! Entries are keyed by [`QueryKey`] and hold a type-erased value so one map
//! serves every resource type.
//!
//! - A value younger than the caller's freshness window is served without a
//!   network call.
//! - An older (or invalidated) value is served immediately while a background
//!   refetch runs.
//! - With no value, the caller awaits the fetch.
//!
//! At most one fetch per key is in flight. Fetches run as spawned tasks that
//! write their own result back, so a caller that goes away does not cancel
//! the request. Concurrent readers share the pending result through a
//! `futures::future::Shared`.
//!
//! TRADE-OFFS
//! ==========
//! Invalidation is by key prefix and ignores filter parameters: a write to a
//! resource marks every cached listing of it stale. Each fetch carries a
//! generation number; invalidation bumps it, so a fetch that started before a
//! write is discarded when it lands instead of overwriting fresher state.

pub mod key;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub use key::{KeyPart, QueryKey};

use crate::config::CacheConfig;
use crate::error::ApiError;

type Erased = Arc<dyn Any + Send + Sync>;
type InFlight = Shared<BoxFuture<'static, Result<Erased, ApiError>>>;

// =============================================================================
// QUERY RESULT
// =============================================================================

/// Snapshot handed back to a reader.
#[derive(Debug)]
pub struct QueryResult<T> {
    pub data: Option<Arc<T>>,
    /// Error from the most recent fetch, if it failed.
    pub error: Option<ApiError>,
    /// `data` is older than the freshness window or was invalidated.
    pub is_stale: bool,
    /// A refetch is running in the background.
    pub is_fetching: bool,
}

impl<T> QueryResult<T> {
    fn ready(data: Arc<T>) -> Self {
        Self { data: Some(data), error: None, is_stale: false, is_fetching: false }
    }

    /// Result of a read that could not start, e.g. for want of an id.
    #[must_use]
    pub fn failed(error: ApiError) -> Self {
        Self { data: None, error: Some(error), is_stale: false, is_fetching: false }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Data if there is any, else the error.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when no data is available.
    pub fn into_result(self) -> Result<Arc<T>, ApiError> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(err)) => Err(err),
            (None, None) => Err(ApiError::Decode("query produced no data".into())),
        }
    }
}

/// Bookkeeping view of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStatus {
    pub has_data: bool,
    pub invalidated: bool,
    pub fetching: bool,
    pub updated_at: Option<Instant>,
}

// =============================================================================
// ENTRIES
// =============================================================================

#[derive(Default)]
struct Entry {
    value: Option<Erased>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Generation of the fetch allowed to settle this entry.
    generation: u64,
    in_flight: Option<InFlight>,
    last_error: Option<ApiError>,
}

impl Entry {
    fn is_fresh(&self, stale_time: Duration, now: Instant) -> bool {
        !self.invalidated
            && self
                .updated_at
                .is_some_and(|at| now.duration_since(at) < stale_time)
    }
}

enum ReadPlan {
    Fresh(Erased),
    Stale { value: Erased, error: Option<ApiError>, fetching: bool },
    Join(InFlight),
    Start,
}

#[derive(Default)]
struct CacheInner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    generation: AtomicU64,
}

// =============================================================================
// QUERY CACHE
// =============================================================================

#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Stale-while-revalidate read.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, stale_time: Duration, fetcher: F) -> QueryResult<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let pending = {
            let mut entries = self.lock();
            let plan = plan_read(entries.get(&key), stale_time);
            match plan {
                ReadPlan::Fresh(value) => {
                    tracing::debug!(key = %key, "cache hit");
                    return match downcast(value, &key) {
                        Ok(data) => QueryResult::ready(data),
                        Err(err) => QueryResult::failed(err),
                    };
                }
                ReadPlan::Stale { value, error, fetching } => {
                    if !fetching {
                        tracing::debug!(key = %key, "cache stale; revalidating");
                        self.start_fetch(&mut entries, &key, fetcher);
                    }
                    return match downcast(value, &key) {
                        Ok(data) => QueryResult { data: Some(data), error, is_stale: true, is_fetching: true },
                        Err(err) => QueryResult::failed(err),
                    };
                }
                ReadPlan::Join(in_flight) => in_flight,
                ReadPlan::Start => {
                    tracing::debug!(key = %key, "cache miss");
                    self.start_fetch(&mut entries, &key, fetcher)
                }
            }
        };

        match pending.await.and_then(|value| downcast(value, &key)) {
            Ok(data) => QueryResult::ready(data),
            Err(err) => QueryResult::failed(err),
        }
    }

    fn start_fetch<T, F, Fut>(&self, entries: &mut HashMap<QueryKey, Entry>, key: &QueryKey, fetcher: F) -> InFlight
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let generation = self.next_generation();
        let cache = self.clone();
        let task_key = key.clone();
        let request = fetcher();
        let handle = tokio::spawn(async move {
            let result = match AssertUnwindSafe(request).catch_unwind().await {
                Ok(result) => result.map(|value| Arc::new(value) as Erased),
                Err(_) => Err(ApiError::Transport("fetch panicked".to_owned())),
            };
            cache.settle(&task_key, generation, &result);
            result
        });
        // The task settles its own entry; this only covers it being aborted.
        let cache = self.clone();
        let join_key = key.clone();
        let in_flight = async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let result = Err(ApiError::Transport(format!("fetch task failed: {e}")));
                    cache.settle(&join_key, generation, &result);
                    result
                }
            }
        }
        .boxed()
        .shared();

        let entry = entries.entry(key.clone()).or_default();
        entry.generation = generation;
        entry.in_flight = Some(in_flight.clone());
        in_flight
    }

    fn settle(&self, key: &QueryKey, generation: u64, result: &Result<Erased, ApiError>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            tracing::debug!(key = %key, "fetch landed after entry was removed; dropping");
            return;
        };
        if entry.generation != generation {
            tracing::debug!(key = %key, "fetch superseded by invalidation; dropping");
            return;
        }
        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.value = Some(Arc::clone(value));
                entry.updated_at = Some(Instant::now());
                entry.invalidated = false;
                entry.last_error = None;
            }
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "fetch failed; keeping previous value");
                entry.last_error = Some(err.clone());
            }
        }
    }

    /// Mark every entry under `prefix` stale. Returns how many were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.lock();
        let mut marked = 0;
        for (_, entry) in entries
            .iter_mut()
            .filter(|(key, _)| key.starts_with(prefix))
        {
            entry.invalidated = true;
            entry.generation = self.next_generation();
            entry.in_flight = None;
            marked += 1;
        }
        tracing::debug!(prefix = %prefix, marked, "cache invalidated");
        marked
    }

    /// Store `value` under `key` as freshly fetched.
    pub fn set_data<T: Send + Sync + 'static>(&self, key: QueryKey, value: T) {
        let generation = self.next_generation();
        let mut entries = self.lock();
        let entry = entries.entry(key).or_default();
        entry.value = Some(Arc::new(value));
        entry.updated_at = Some(Instant::now());
        entry.invalidated = false;
        entry.generation = generation;
        entry.in_flight = None;
        entry.last_error = None;
    }

    /// Cached value for `key`, fresh or not.
    #[must_use]
    pub fn get_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let value = self.lock().get(key)?.value.clone()?;
        value.downcast::<T>().ok()
    }

    #[must_use]
    pub fn status(&self, key: &QueryKey) -> Option<EntryStatus> {
        self.lock().get(key).map(|entry| EntryStatus {
            has_data: entry.value.is_some(),
            invalidated: entry.invalidated,
            fetching: entry.in_flight.is_some(),
            updated_at: entry.updated_at,
        })
    }

    /// Wait for the fetch currently running for `key`, if any. Returns whether
    /// there was one.
    pub async fn await_in_flight(&self, key: &QueryKey) -> bool {
        let pending = self
            .lock()
            .get(key)
            .and_then(|entry| entry.in_flight.clone());
        match pending {
            Some(in_flight) => {
                let _ = in_flight.await;
                true
            }
            None => false,
        }
    }

    /// Drop every entry under `prefix`.
    pub fn remove(&self, prefix: &QueryKey) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
        tracing::debug!("cache cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop idle entries not refreshed within `gc_time`.
    pub fn prune(&self, gc_time: Duration) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| {
            entry.in_flight.is_some()
                || entry
                    .updated_at
                    .is_some_and(|at| now.duration_since(at) < gc_time)
        });
        before - entries.len()
    }

    /// Spawn the background collector. Returns a handle for shutdown.
    pub fn spawn_gc(&self, config: CacheConfig) -> JoinHandle<()> {
        let cache = self.clone();
        tracing::info!(
            gc_secs = config.gc_time.as_secs(),
            interval_secs = config.gc_interval.as_secs(),
            "query cache collector configured"
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.gc_interval.max(Duration::from_secs(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let pruned = cache.prune(config.gc_time);
                if pruned > 0 {
                    tracing::debug!(pruned, "query cache pruned");
                }
            }
        })
    }
}

fn plan_read(entry: Option<&Entry>, stale_time: Duration) -> ReadPlan {
    let Some(entry) = entry else {
        return ReadPlan::Start;
    };
    match &entry.value {
        Some(value) if entry.is_fresh(stale_time, Instant::now()) => ReadPlan::Fresh(Arc::clone(value)),
        Some(value) => ReadPlan::Stale {
            value: Arc::clone(value),
            error: entry.last_error.clone(),
            fetching: entry.in_flight.is_some(),
        },
        None => match &entry.in_flight {
            Some(in_flight) => ReadPlan::Join(in_flight.clone()),
            None => ReadPlan::Start,
        },
    }
}

fn downcast<T: Send + Sync + 'static>(value: Erased, key: &QueryKey) -> Result<Arc<T>, ApiError> {
    value
        .downcast::<T>()
        .map_err(|_| ApiError::Decode(format!("cached value for {key} has an unexpected type")))
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
