//! Shared data-layer context.
//!
//! DESIGN
//! ======
//! Every resource operation takes `&DataContext`. It bundles the one API
//! client, the one query cache and the notifier, so there is no ambient global
//! state. Clone is cheap: every field is an `Arc` or wraps one.
//!
//! A context built with [`DataContext::connect`] also owns the cache collector
//! task. The task is aborted when the last clone of the context is dropped.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::cache::QueryCache;
use crate::config::{ApiConfig, CacheConfig};
use crate::error::ApiError;
use crate::notify::{Notice, Notifier, TracingNotifier};
use crate::session::CookieStore;

#[derive(Clone)]
pub struct DataContext {
    pub api: ApiClient,
    pub cache: QueryCache,
    pub notifier: Arc<dyn Notifier>,
    collector: Option<Arc<Collector>>,
}

struct Collector(JoinHandle<()>);

impl Drop for Collector {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl DataContext {
    #[must_use]
    pub fn new(api: ApiClient, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, cache, notifier, collector: None }
    }

    /// Context with an empty cache that logs its notices.
    ///
    /// When called inside a tokio runtime this also starts the collector that
    /// drops idle cache entries per `cache_config`. Outside a runtime there is
    /// nothing to run it on and the cache simply grows for the life of the
    /// context.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn connect(
        config: &ApiConfig,
        cache_config: CacheConfig,
        cookies: Arc<dyn CookieStore>,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(config, cookies)?;
        let mut ctx = Self::new(api, QueryCache::new(), Arc::new(TracingNotifier));
        if tokio::runtime::Handle::try_current().is_ok() {
            ctx.collector = Some(Arc::new(Collector(ctx.cache.spawn_gc(cache_config))));
        } else {
            tracing::debug!("no runtime, query cache collector not started");
        }
        Ok(ctx)
    }

    /// Whether this context runs a background cache collector.
    #[must_use]
    pub fn collects_garbage(&self) -> bool {
        self.collector.is_some()
    }

    /// Cookie store the session lives in.
    #[must_use]
    pub fn cookies(&self) -> &dyn CookieStore {
        self.api.cookies().as_ref()
    }

    pub(crate) fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
