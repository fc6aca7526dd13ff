//! Restaurants on the platform.

use std::time::Duration;

use super::{ListParams, TWO_MINUTES, list_request, read, write, write_discarding};
use crate::api::{ApiRequest, Page};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{Restaurant, RestaurantInput, StatusUpdate};

pub const STALE_TIME: Duration = TWO_MINUTES;

const PATH: &str = "/api/admin/restaurants";

#[must_use]
pub fn list_prefix() -> QueryKey {
    QueryKey::new("restaurants")
}

#[must_use]
pub fn list_key(params: &ListParams) -> QueryKey {
    list_prefix().params(params.key_params())
}

#[must_use]
pub fn detail_key(id: i64) -> QueryKey {
    QueryKey::new("restaurant").id(id)
}

pub async fn list(ctx: &DataContext, params: &ListParams) -> QueryResult<Page<Restaurant>> {
    read(ctx, list_key(params), STALE_TIME, list_request(PATH, params), "Failed to load restaurants").await
}

pub async fn get(ctx: &DataContext, id: i64) -> QueryResult<Restaurant> {
    let request = ApiRequest::get(format!("{PATH}/{id}"));
    read(ctx, detail_key(id), STALE_TIME, request, "Failed to load restaurant").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn create(ctx: &DataContext, input: &RestaurantInput) -> Result<Option<Restaurant>, ApiError> {
    let request = ApiRequest::post(PATH).json(input);
    write(ctx, request, &[list_prefix()], "Restaurant created", "Failed to create restaurant").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, id: i64, input: &RestaurantInput) -> Result<Option<Restaurant>, ApiError> {
    let request = ApiRequest::put(format!("{PATH}/{id}")).json(input);
    write(ctx, request, &[list_prefix(), detail_key(id)], "Restaurant updated", "Failed to update restaurant").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn set_active(ctx: &DataContext, id: i64, is_active: bool) -> Result<Option<Restaurant>, ApiError> {
    let request = ApiRequest::patch(format!("{PATH}/{id}/status")).json(&StatusUpdate { is_active });
    let success = if is_active { "Restaurant activated" } else { "Restaurant deactivated" };
    write(ctx, request, &[list_prefix(), detail_key(id)], success, "Failed to change restaurant status").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn delete(ctx: &DataContext, id: i64) -> Result<(), ApiError> {
    let request = Ok(ApiRequest::delete(format!("{PATH}/{id}")));
    write_discarding(ctx, request, &[list_prefix(), detail_key(id)], "Restaurant deleted", "Failed to delete restaurant")
        .await
}

#[cfg(test)]
#[path = "restaurants_test.rs"]
mod tests;
