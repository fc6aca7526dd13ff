//! Promotional banners. New banners upload their image as multipart form
//! data; later edits are plain JSON.

use std::time::Duration;

use super::{ListParams, TWO_MINUTES, list_request, read, write, write_discarding};
use crate::api::{ApiRequest, Page};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{Banner, BannerInput, BannerUpload, StatusUpdate};

pub const STALE_TIME: Duration = TWO_MINUTES;

const PATH: &str = "/api/admin/banners";

#[must_use]
pub fn list_prefix() -> QueryKey {
    QueryKey::new("banners")
}

#[must_use]
pub fn list_key(params: &ListParams) -> QueryKey {
    list_prefix().params(params.key_params())
}

pub async fn list(ctx: &DataContext, params: &ListParams) -> QueryResult<Page<Banner>> {
    read(ctx, list_key(params), STALE_TIME, list_request(PATH, params), "Failed to load banners").await
}

/// # Errors
///
/// Returns the encoding, backend or transport error; the cache is left
/// untouched.
pub async fn create(ctx: &DataContext, upload: BannerUpload) -> Result<Option<Banner>, ApiError> {
    let request = upload
        .into_form()
        .map(|form| ApiRequest::post(PATH).multipart(form));
    write(ctx, request, &[list_prefix()], "Banner created", "Failed to create banner").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, id: i64, input: &BannerInput) -> Result<Option<Banner>, ApiError> {
    let request = ApiRequest::put(format!("{PATH}/{id}")).json(input);
    write(ctx, request, &[list_prefix()], "Banner updated", "Failed to update banner").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn set_active(ctx: &DataContext, id: i64, is_active: bool) -> Result<Option<Banner>, ApiError> {
    let request = ApiRequest::patch(format!("{PATH}/{id}/status")).json(&StatusUpdate { is_active });
    let success = if is_active { "Banner activated" } else { "Banner deactivated" };
    write(ctx, request, &[list_prefix()], success, "Failed to change banner status").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn delete(ctx: &DataContext, id: i64) -> Result<(), ApiError> {
    let request = Ok(ApiRequest::delete(format!("{PATH}/{id}")));
    write_discarding(ctx, request, &[list_prefix()], "Banner deleted", "Failed to delete banner").await
}

#[cfg(test)]
#[path = "banners_test.rs"]
mod tests;
