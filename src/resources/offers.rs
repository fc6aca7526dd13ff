//! Discount offers.

use std::time::Duration;

use super::{ListParams, THREE_MINUTES, list_request, read, write, write_discarding};
use crate::api::{ApiRequest, Page};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{Offer, OfferInput};

pub const STALE_TIME: Duration = THREE_MINUTES;

const PATH: &str = "/api/admin/offers";

#[must_use]
pub fn list_prefix() -> QueryKey {
    QueryKey::new("offers")
}

#[must_use]
pub fn list_key(params: &ListParams) -> QueryKey {
    list_prefix().params(params.key_params())
}

pub async fn list(ctx: &DataContext, params: &ListParams) -> QueryResult<Page<Offer>> {
    read(ctx, list_key(params), STALE_TIME, list_request(PATH, params), "Failed to load offers").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn create(ctx: &DataContext, input: &OfferInput) -> Result<Option<Offer>, ApiError> {
    let request = ApiRequest::post(PATH).json(input);
    write(ctx, request, &[list_prefix()], "Offer created", "Failed to create offer").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, id: i64, input: &OfferInput) -> Result<Option<Offer>, ApiError> {
    let request = ApiRequest::put(format!("{PATH}/{id}")).json(input);
    write(ctx, request, &[list_prefix()], "Offer updated", "Failed to update offer").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn delete(ctx: &DataContext, id: i64) -> Result<(), ApiError> {
    let request = Ok(ApiRequest::delete(format!("{PATH}/{id}")));
    write_discarding(ctx, request, &[list_prefix()], "Offer deleted", "Failed to delete offer").await
}

#[cfg(test)]
#[path = "offers_test.rs"]
mod tests;
