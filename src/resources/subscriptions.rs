//! Customer subscription plans.

use std::time::Duration;

use super::{FIVE_MINUTES, ListParams, list_request, read, write, write_discarding};
use crate::api::{ApiRequest, Page};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{Subscription, SubscriptionInput};

pub const STALE_TIME: Duration = FIVE_MINUTES;

const PATH: &str = "/api/admin/subscriptions";

#[must_use]
pub fn list_prefix() -> QueryKey {
    QueryKey::new("subscriptions")
}

#[must_use]
pub fn list_key(params: &ListParams) -> QueryKey {
    list_prefix().params(params.key_params())
}

pub async fn list(ctx: &DataContext, params: &ListParams) -> QueryResult<Page<Subscription>> {
    read(ctx, list_key(params), STALE_TIME, list_request(PATH, params), "Failed to load subscriptions").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn create(ctx: &DataContext, input: &SubscriptionInput) -> Result<Option<Subscription>, ApiError> {
    let request = ApiRequest::post(PATH).json(input);
    write(ctx, request, &[list_prefix()], "Subscription created", "Failed to create subscription").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, id: i64, input: &SubscriptionInput) -> Result<Option<Subscription>, ApiError> {
    let request = ApiRequest::put(format!("{PATH}/{id}")).json(input);
    write(ctx, request, &[list_prefix()], "Subscription updated", "Failed to update subscription").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn delete(ctx: &DataContext, id: i64) -> Result<(), ApiError> {
    let request = Ok(ApiRequest::delete(format!("{PATH}/{id}")));
    write_discarding(ctx, request, &[list_prefix()], "Subscription deleted", "Failed to delete subscription").await
}

#[cfg(test)]
#[path = "subscriptions_test.rs"]
mod tests;
