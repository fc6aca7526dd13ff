//! Sign-in, token refresh and password flows.
//!
//! DESIGN
//! ======
//! `request_*` functions only talk to the backend and hand back the issued
//! tokens; the server's auth routes use them and write real cookies. The
//! context-level functions store the session in the context's cookie store.
//!
//! A sign-in or sign-out changes whose data the cache holds, so both clear it.
//! Operations that need the signed-in admin's id fail with
//! [`ApiError::MissingIdentifier`] before any request when it is absent or
//! not an integer.

use std::time::Duration;

use super::{FIVE_MINUTES, read, read_failed, write_discarding};
use crate::api::{ApiClient, ApiRequest};
use crate::cache::{QueryKey, QueryResult};
use crate::context::DataContext;
use crate::error::ApiError;
use crate::models::{
    AdminUser, AuthTokens, ForgotPasswordRequest, PasswordChange, RefreshRequest, ResetPasswordRequest,
    SignInRequest,
};
use crate::notify::Notice;
use crate::session::{self, Session};

pub const STALE_TIME: Duration = FIVE_MINUTES;

const SIGN_IN_PATH: &str = "/api/auth/signin";
const REFRESH_PATH: &str = "/api/auth/refresh";

/// Prefix of the signed-in admin's own record. User and role writes mark it
/// stale along with the admin listings.
#[must_use]
pub fn current_admin_prefix() -> QueryKey {
    QueryKey::new("currentAdmin")
}

#[must_use]
pub fn current_admin_key(user_id: i64) -> QueryKey {
    current_admin_prefix().id(user_id)
}

/// Id of the signed-in admin. The cookie ends up in request paths, so anything
/// that is not a plain integer counts as no id at all.
fn signed_in_admin_id(ctx: &DataContext) -> Result<i64, ApiError> {
    let raw = session::user_id(ctx.cookies()).ok_or(ApiError::MissingIdentifier("user id"))?;
    raw.trim().parse::<i64>().map_err(|_| {
        tracing::warn!("userId cookie is not numeric; treating the admin as unidentified");
        ApiError::MissingIdentifier("user id")
    })
}

// =============================================================================
// BACKEND CALLS
// =============================================================================

/// Exchange credentials for tokens.
///
/// # Errors
///
/// Returns the backend or transport error.
pub async fn request_sign_in(api: &ApiClient, credentials: &SignInRequest) -> Result<AuthTokens, ApiError> {
    let request = ApiRequest::post(SIGN_IN_PATH).json(credentials)?;
    api.send_data(request).await
}

/// Exchange a refresh token for a new token pair.
///
/// # Errors
///
/// Returns the backend or transport error.
pub async fn request_refresh(api: &ApiClient, refresh_token: &str) -> Result<AuthTokens, ApiError> {
    let body = RefreshRequest { refresh_token: refresh_token.to_owned() };
    let request = ApiRequest::post(REFRESH_PATH).json(&body)?;
    api.send_data(request).await
}

/// Session for newly issued `tokens`, keeping fields of `previous` the
/// backend did not reissue.
#[must_use]
pub fn session_from_tokens(tokens: &AuthTokens, previous: Option<&Session>) -> Session {
    Session {
        access_token: tokens.access_token.clone(),
        refresh_token: tokens
            .refresh_token
            .clone()
            .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
        user_id: tokens
            .admin_id()
            .map(|id| id.to_string())
            .or_else(|| previous.and_then(|p| p.user_id.clone())),
    }
}

// =============================================================================
// CONTEXT OPERATIONS
// =============================================================================

/// Sign in and store the session.
///
/// # Errors
///
/// Returns the backend or transport error; the stored session is unchanged.
pub async fn sign_in(ctx: &DataContext, credentials: &SignInRequest) -> Result<Session, ApiError> {
    match request_sign_in(&ctx.api, credentials).await {
        Ok(tokens) => {
            let session = session_from_tokens(&tokens, None);
            session.save(ctx.cookies());
            ctx.cache.clear();
            tracing::info!(user_id = session.user_id.as_deref().unwrap_or("-"), "signed in");
            ctx.notify(Notice::success("Signed in"));
            Ok(session)
        }
        Err(err) => {
            tracing::warn!(error = %err, "sign-in failed");
            ctx.notify(Notice::from_error(&err, "Sign in failed"));
            Err(err)
        }
    }
}

/// Rotate the stored tokens. Silent on success.
///
/// # Errors
///
/// Returns [`ApiError::MissingIdentifier`] without a stored refresh token,
/// else the backend or transport error.
pub async fn refresh(ctx: &DataContext) -> Result<Session, ApiError> {
    let result = match session::refresh_token(ctx.cookies()) {
        Some(token) => request_refresh(&ctx.api, &token).await,
        None => Err(ApiError::MissingIdentifier("refresh token")),
    };
    match result {
        Ok(tokens) => {
            let previous = Session::load(ctx.cookies());
            let session = session_from_tokens(&tokens, previous.as_ref());
            session.save(ctx.cookies());
            tracing::debug!("session refreshed");
            Ok(session)
        }
        Err(err) => {
            ctx.notify(Notice::from_error(&err, "Session refresh failed"));
            Err(err)
        }
    }
}

/// Forget the session and everything cached under it.
pub fn sign_out(ctx: &DataContext) {
    Session::clear(ctx.cookies());
    ctx.cache.clear();
    tracing::info!("signed out");
    ctx.notify(Notice::success("Signed out"));
}

/// The signed-in admin's own record.
pub async fn current_admin(ctx: &DataContext) -> QueryResult<AdminUser> {
    let user_id = match signed_in_admin_id(ctx) {
        Ok(id) => id,
        Err(err) => return read_failed(ctx, err, "Failed to load profile"),
    };
    let request = ApiRequest::get(format!("/api/admin/users/{user_id}"));
    read(ctx, current_admin_key(user_id), STALE_TIME, request, "Failed to load profile").await
}

/// # Errors
///
/// Returns [`ApiError::MissingIdentifier`] when no admin is signed in or the
/// stored id is not numeric, else the backend or transport error.
pub async fn change_password(ctx: &DataContext, change: &PasswordChange) -> Result<(), ApiError> {
    let request =
        signed_in_admin_id(ctx).and_then(|id| ApiRequest::put(format!("/api/admin/users/{id}/password")).json(change));
    write_discarding(ctx, request, &[], "Password changed", "Failed to change password").await
}

/// Ask the backend to email a reset link.
///
/// # Errors
///
/// Returns the backend or transport error.
pub async fn forgot_password(ctx: &DataContext, email: &str) -> Result<(), ApiError> {
    let request = ApiRequest::post("/api/auth/forgot-password").json(&ForgotPasswordRequest { email: email.to_owned() });
    write_discarding(ctx, request, &[], "Reset link sent", "Failed to send reset link").await
}

/// # Errors
///
/// Returns the backend or transport error.
pub async fn reset_password(ctx: &DataContext, reset: &ResetPasswordRequest) -> Result<(), ApiError> {
    let request = ApiRequest::post("/api/auth/reset-password").json(reset);
    write_discarding(ctx, request, &[], "Password reset", "Failed to reset password").await
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
