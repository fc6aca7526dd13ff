//! Per-resource reads and writes.
//!
//! DESIGN
//! ======
//! Each submodule maps one backend resource onto two helpers:
//!
//! - [`read`] goes through the query cache under the resource's key and
//!   freshness window. A failed fetch with no previous data to fall back on
//!   raises one notice, however many readers were waiting on it.
//! - [`write`] calls the backend directly. Once the backend accepts the write
//!   it invalidates the affected key prefixes and raises a success notice,
//!   before looking at the response body. Many write endpoints answer with
//!   `{ "success": true }` and no `data`, so the decoded value is optional.
//!   On failure it raises an error notice and leaves the cache alone.
//!
//! Both also return their outcome so the caller can react beyond the notice.
//!
//! Invalidation is by resource prefix, not by filter: creating a banner marks
//! every cached banner listing stale, whatever page or search it was for.

pub mod auth;
pub mod banners;
pub mod menu;
pub mod offers;
pub mod orders;
pub mod permissions;
pub mod preferences;
pub mod referral;
pub mod restaurants;
pub mod roles;
pub mod subscriptions;
pub mod users;

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::{DeserializeOwned, IgnoredAny};

use crate::api::ApiRequest;
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::notify::Notice;

pub const TWO_MINUTES: Duration = Duration::from_secs(2 * 60);
pub const THREE_MINUTES: Duration = Duration::from_secs(3 * 60);
pub const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);

// =============================================================================
// LIST PARAMETERS
// =============================================================================

/// Paging, sorting and filtering for list endpoints.
///
/// The same values become the query string and the parameter part of the
/// cache key, so two reads with equal parameters share one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
    /// Backend sort expression, e.g. `createdAt,desc`.
    pub sort: Option<String>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self { page: 0, size: 10, sort: None, search: None, filters: BTreeMap::new() }
    }
}

impl ListParams {
    #[must_use]
    pub fn page(mut self, page: u32, size: u32) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Query string pairs. Blank search and sort values are left out.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("page".to_owned(), self.page.to_string()), ("size".to_owned(), self.size.to_string())];
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("sort".to_owned(), sort.to_owned()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search".to_owned(), search.to_owned()));
        }
        for (name, value) in &self.filters {
            if !value.is_empty() {
                pairs.push((name.clone(), value.clone()));
            }
        }
        pairs
    }

    /// Parameter part of a cache key.
    #[must_use]
    pub fn key_params(&self) -> BTreeMap<String, String> {
        self.to_pairs().into_iter().collect()
    }
}

// =============================================================================
// READ / WRITE
// =============================================================================

/// Cached read of `request` under `key`.
///
/// A failure with no previous data to fall back on raises an error notice
/// using `failure` as the generic text. The notice is raised by the fetch
/// itself, so concurrent readers sharing it see a single notice.
pub(crate) async fn read<T>(
    ctx: &DataContext,
    key: QueryKey,
    stale_time: Duration,
    request: ApiRequest,
    failure: &str,
) -> QueryResult<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let fetch_ctx = ctx.clone();
    let fetch_key = key.clone();
    let failure = failure.to_owned();
    ctx.cache
        .query(key, stale_time, move || async move {
            let outcome = fetch_ctx.api.send_data::<T>(request).await;
            if let Err(err) = &outcome {
                if fetch_ctx.cache.get_data::<T>(&fetch_key).is_none() {
                    fetch_ctx.notify(Notice::from_error(err, &failure));
                }
            }
            outcome
        })
        .await
}

/// A read that failed before reaching the cache.
pub(crate) fn read_failed<T>(ctx: &DataContext, err: ApiError, failure: &str) -> QueryResult<T> {
    ctx.notify(Notice::from_error(&err, failure));
    QueryResult::failed(err)
}

/// Send a write and invalidate `invalidates` when the backend accepts it.
///
/// `request` is a `Result` because encoding the body can fail; that failure is
/// reported the same way as a backend one. The response payload is decoded
/// after the cache and notice are handled: a missing or null `data` is
/// `Ok(None)`, and a payload of the wrong shape is a `Decode` error that does
/// not undo the invalidation.
pub(crate) async fn write<T>(
    ctx: &DataContext,
    request: Result<ApiRequest, ApiError>,
    invalidates: &[QueryKey],
    success: &str,
    failure: &str,
) -> Result<Option<T>, ApiError>
where
    T: DeserializeOwned,
{
    let outcome = match request {
        Ok(request) => ctx.api.send_raw(request).await,
        Err(err) => Err(err),
    };
    let payload = match outcome {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = %err, "write failed; cache left untouched");
            ctx.notify(Notice::from_error(&err, failure));
            return Err(err);
        }
    };

    for prefix in invalidates {
        let marked = ctx.cache.invalidate(prefix);
        tracing::debug!(prefix = %prefix, marked, "invalidated after write");
    }
    ctx.notify(Notice::success(success));

    serde_json::from_value::<Option<T>>(payload).map_err(|e| {
        tracing::warn!(error = %e, "write succeeded but its response did not decode");
        ApiError::Decode(e.to_string())
    })
}

/// [`write`] for endpoints whose response body is not needed.
pub(crate) async fn write_discarding(
    ctx: &DataContext,
    request: Result<ApiRequest, ApiError>,
    invalidates: &[QueryKey],
    success: &str,
    failure: &str,
) -> Result<(), ApiError> {
    write::<IgnoredAny>(ctx, request, invalidates, success, failure)
        .await
        .map(|_| ())
}

pub(crate) fn list_request(path: &str, params: &ListParams) -> ApiRequest {
    ApiRequest::get(path).query_pairs(params.to_pairs())
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
