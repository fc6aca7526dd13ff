//! Referral and loyalty-points settings.

use std::time::Duration;

use super::{FIVE_MINUTES, read, write};
use crate::api::ApiRequest;
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{ReferralSettings, ReferralSettingsInput};

pub const STALE_TIME: Duration = FIVE_MINUTES;

const PATH: &str = "/api/admin/referral-settings";

#[must_use]
pub fn key() -> QueryKey {
    QueryKey::new("referralSettings")
}

pub async fn get(ctx: &DataContext) -> QueryResult<ReferralSettings> {
    read(ctx, key(), STALE_TIME, ApiRequest::get(PATH), "Failed to load referral settings").await
}

/// # Errors
///
/// Returns the backend or transport error; the cache is left untouched.
pub async fn update(ctx: &DataContext, patch: &ReferralSettingsInput) -> Result<Option<ReferralSettings>, ApiError> {
    let request = ApiRequest::patch(PATH).json(patch);
    write(ctx, request, &[key()], "Referral settings saved", "Failed to save referral settings").await
}

#[cfg(test)]
#[path = "referral_test.rs"]
mod tests;
