//! Admin user accounts.

use std::time::Duration;

use super::{FIVE_MINUTES, ListParams, auth, list_request, read, write, write_discarding};
use crate::api::{ApiRequest, Page};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{AdminUser, AdminUserInput, StatusUpdate};

pub const STALE_TIME: Duration = FIVE_MINUTES;

const PATH: &str = "/api/admin/users";

/// Prefix of every user listing.
#[must_use]
pub fn list_prefix() -> QueryKey {
    QueryKey::new("adminUsers")
}

#[must_use]
pub fn list_key(params: &ListParams) -> QueryKey {
    list_prefix().params(params.key_params())
}

#[must_use]
pub fn detail_prefix() -> QueryKey {
    QueryKey::new("adminUser")
}

#[must_use]
pub fn detail_key(id: i64) -> QueryKey {
    detail_prefix().id(id)
}

/// Keys a change to user `id` makes stale. The signed-in admin may be that
/// user, so their own record goes too.
fn affected(id: i64) -> [QueryKey; 3] {
    [list_prefix(), detail_key(id), auth::current_admin_key(id)]
}

pub async fn list(ctx: &DataContext, params: &ListParams) -> QueryResult<Page<AdminUser>> {
    read(ctx, list_key(params), STALE_TIME, list_request(PATH, params), "Failed to load users").await
}

pub async fn get(ctx: &DataContext, id: i64) -> QueryResult<AdminUser> {
    read(ctx, detail_key(id), STALE_TIME, ApiRequest::get(format!("{PATH}/{id}")), "Failed to load user").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn create(ctx: &DataContext, input: &AdminUserInput) -> Result<Option<AdminUser>, ApiError> {
    let request = ApiRequest::post(PATH).json(input);
    write(ctx, request, &[list_prefix()], "User created", "Failed to create user").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, id: i64, input: &AdminUserInput) -> Result<Option<AdminUser>, ApiError> {
    let request = ApiRequest::put(format!("{PATH}/{id}")).json(input);
    write(ctx, request, &affected(id), "User updated", "Failed to update user").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn set_active(ctx: &DataContext, id: i64, is_active: bool) -> Result<Option<AdminUser>, ApiError> {
    let request = ApiRequest::patch(format!("{PATH}/{id}/status")).json(&StatusUpdate { is_active });
    let success = if is_active { "User activated" } else { "User deactivated" };
    write(ctx, request, &affected(id), success, "Failed to change user status").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn delete(ctx: &DataContext, id: i64) -> Result<(), ApiError> {
    let request = Ok(ApiRequest::delete(format!("{PATH}/{id}")));
    write_discarding(ctx, request, &affected(id), "User deleted", "Failed to delete user").await
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
