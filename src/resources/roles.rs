//! Roles and their permission sets.
//!
//! Role changes alter what each admin can do, so every write also marks the
//! user listings, user records and the signed-in admin's own record stale
//! (they all embed role names and permissions).

use std::time::Duration;

use super::{FIVE_MINUTES, auth, read, users, write, write_discarding};
use crate::api::ApiRequest;
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{PermissionAssignment, Role, RoleInput};

pub const STALE_TIME: Duration = FIVE_MINUTES;

const PATH: &str = "/api/admin/roles";

#[must_use]
pub fn list_key() -> QueryKey {
    QueryKey::new("roles")
}

#[must_use]
pub fn detail_prefix() -> QueryKey {
    QueryKey::new("role")
}

#[must_use]
pub fn detail_key(id: i64) -> QueryKey {
    detail_prefix().id(id)
}

fn affected() -> [QueryKey; 5] {
    [list_key(), detail_prefix(), users::list_prefix(), users::detail_prefix(), auth::current_admin_prefix()]
}

pub async fn list(ctx: &DataContext) -> QueryResult<Vec<Role>> {
    read(ctx, list_key(), STALE_TIME, ApiRequest::get(PATH), "Failed to load roles").await
}

pub async fn get(ctx: &DataContext, id: i64) -> QueryResult<Role> {
    read(ctx, detail_key(id), STALE_TIME, ApiRequest::get(format!("{PATH}/{id}")), "Failed to load role").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn create(ctx: &DataContext, input: &RoleInput) -> Result<Option<Role>, ApiError> {
    let request = ApiRequest::post(PATH).json(input);
    write(ctx, request, &affected(), "Role created", "Failed to create role").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, id: i64, input: &RoleInput) -> Result<Option<Role>, ApiError> {
    let request = ApiRequest::put(format!("{PATH}/{id}")).json(input);
    write(ctx, request, &affected(), "Role updated", "Failed to update role").await
}

/// Replace the role's permission set.
///
/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn assign_permissions(ctx: &DataContext, id: i64, permission_ids: &[i64]) -> Result<Option<Role>, ApiError> {
    let request = ApiRequest::put(format!("{PATH}/{id}/permissions")).json(&PermissionAssignment { permission_ids });
    write(ctx, request, &affected(), "Permissions updated", "Failed to update permissions").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn delete(ctx: &DataContext, id: i64) -> Result<(), ApiError> {
    let request = Ok(ApiRequest::delete(format!("{PATH}/{id}")));
    write_discarding(ctx, request, &affected(), "Role deleted", "Failed to delete role").await
}

#[cfg(test)]
#[path = "roles_test.rs"]
mod tests;
