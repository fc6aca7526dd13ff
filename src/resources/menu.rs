//! Menu items, listed per restaurant.
//!
//! Listings are keyed `['menuItems', restaurantId, params]`. Writes invalidate
//! the whole `menuItems` prefix rather than only the owning restaurant, since
//! an update by item id does not say which restaurant it belongs to.

use std::time::Duration;

use super::{ListParams, TWO_MINUTES, list_request, read, write, write_discarding};
use crate::api::{ApiRequest, Page};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{AvailabilityUpdate, MenuItem, MenuItemInput};

pub const STALE_TIME: Duration = TWO_MINUTES;

const ITEM_PATH: &str = "/api/admin/menu-items";

#[must_use]
pub fn list_prefix() -> QueryKey {
    QueryKey::new("menuItems")
}

#[must_use]
pub fn list_key(restaurant_id: i64, params: &ListParams) -> QueryKey {
    list_prefix().id(restaurant_id).params(params.key_params())
}

#[must_use]
pub fn detail_prefix() -> QueryKey {
    QueryKey::new("menuItem")
}

#[must_use]
pub fn detail_key(id: i64) -> QueryKey {
    detail_prefix().id(id)
}

fn restaurant_path(restaurant_id: i64) -> String {
    format!("/api/admin/restaurants/{restaurant_id}/menu-items")
}

pub async fn list(ctx: &DataContext, restaurant_id: i64, params: &ListParams) -> QueryResult<Page<MenuItem>> {
    let request = list_request(&restaurant_path(restaurant_id), params);
    read(ctx, list_key(restaurant_id, params), STALE_TIME, request, "Failed to load menu items").await
}

pub async fn get(ctx: &DataContext, id: i64) -> QueryResult<MenuItem> {
    let request = ApiRequest::get(format!("{ITEM_PATH}/{id}"));
    read(ctx, detail_key(id), STALE_TIME, request, "Failed to load menu item").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn create(ctx: &DataContext, restaurant_id: i64, input: &MenuItemInput) -> Result<Option<MenuItem>, ApiError> {
    let request = ApiRequest::post(restaurant_path(restaurant_id)).json(input);
    write(ctx, request, &[list_prefix()], "Menu item created", "Failed to create menu item").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, id: i64, input: &MenuItemInput) -> Result<Option<MenuItem>, ApiError> {
    let request = ApiRequest::put(format!("{ITEM_PATH}/{id}")).json(input);
    write(ctx, request, &[list_prefix(), detail_prefix()], "Menu item updated", "Failed to update menu item").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn set_available(ctx: &DataContext, id: i64, is_available: bool) -> Result<Option<MenuItem>, ApiError> {
    let request = ApiRequest::patch(format!("{ITEM_PATH}/{id}/availability")).json(&AvailabilityUpdate { is_available });
    let success = if is_available { "Menu item available" } else { "Menu item unavailable" };
    write(ctx, request, &[list_prefix(), detail_prefix()], success, "Failed to change availability").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn delete(ctx: &DataContext, id: i64) -> Result<(), ApiError> {
    let request = Ok(ApiRequest::delete(format!("{ITEM_PATH}/{id}")));
    write_discarding(ctx, request, &[list_prefix(), detail_prefix()], "Menu item deleted", "Failed to delete menu item")
        .await
}

#[cfg(test)]
#[path = "menu_test.rs"]
mod tests;
