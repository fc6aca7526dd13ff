//! Platform-wide preferences, a single record patched in place.

use std::time::Duration;

use super::{FIVE_MINUTES, read, write};
use crate::api::ApiRequest;
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{Preferences, PreferencesInput};

pub const STALE_TIME: Duration = FIVE_MINUTES;

const PATH: &str = "/api/admin/preferences";

#[must_use]
pub fn key() -> QueryKey {
    QueryKey::new("preferences")
}

pub async fn get(ctx: &DataContext) -> QueryResult<Preferences> {
    read(ctx, key(), STALE_TIME, ApiRequest::get(PATH), "Failed to load preferences").await
}

/// Patch only the fields set in `patch`.
///
/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, patch: &PreferencesInput) -> Result<Option<Preferences>, ApiError> {
    let request = ApiRequest::patch(PATH).json(patch);
    write(ctx, request, &[key()], "Preferences saved", "Failed to save preferences").await
}

#[cfg(test)]
#[path = "preferences_test.rs"]
mod tests;
