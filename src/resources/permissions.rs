//! Permission catalogue. Read only; permissions are defined by the backend.

use std::time::Duration;

use super::{FIVE_MINUTES, read};
use crate::api::ApiRequest;
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::models::Permission;

pub const STALE_TIME: Duration = FIVE_MINUTES;

#[must_use]
pub fn list_key() -> QueryKey {
    QueryKey::new("permissions")
}

pub async fn list(ctx: &DataContext) -> QueryResult<Vec<Permission>> {
    let request = ApiRequest::get("/api/admin/permissions");
    read(ctx, list_key(), STALE_TIME, request, "Failed to load permissions").await
}
