//! Auth routes: sign-in, token refresh, sign-out and session probe.
//!
//! The browser never sees the backend's tokens in a response body. Sign-in
//! and refresh write them into cookies (`accessToken` and `refreshToken` are
//! HTTP-only, `userId` is readable so page code can send the admin header).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use dashboard::error::{ApiError, ErrorKind};
use dashboard::models::SignInRequest;
use dashboard::resources::auth as auth_ops;
use dashboard::session::{ACCESS_TOKEN, CookieSpec, REFRESH_TOKEN, SESSION_COOKIES, Session, USER_ID};
use serde::Serialize;
use serde_json::json;
use time::Duration;

use crate::state::AppState;

// =============================================================================
// COOKIES
// =============================================================================

fn session_cookie(spec: &CookieSpec, value: String, secure: bool) -> Cookie<'static> {
    let max_age = i64::try_from(spec.max_age.as_secs()).unwrap_or(i64::MAX);
    Cookie::build((spec.name, value))
        .path("/")
        .http_only(spec.http_only)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age))
        .build()
}

fn expired_cookie(spec: &CookieSpec, secure: bool) -> Cookie<'static> {
    Cookie::build((spec.name, ""))
        .path("/")
        .http_only(spec.http_only)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Add a cookie per present session field and expire the absent ones.
fn write_session(jar: CookieJar, session: &Session, secure: bool) -> CookieJar {
    let fields = [
        (&ACCESS_TOKEN, Some(session.access_token.clone())),
        (&REFRESH_TOKEN, session.refresh_token.clone()),
        (&USER_ID, session.user_id.clone()),
    ];
    fields.into_iter().fold(jar, |jar, (spec, value)| match value {
        Some(value) => jar.add(session_cookie(spec, value, secure)),
        None => jar.add(expired_cookie(spec, secure)),
    })
}

fn read_cookie(jar: &CookieJar, spec: &CookieSpec) -> Option<String> {
    jar.get(spec.name)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

fn jar_session(jar: &CookieJar) -> Option<Session> {
    Some(Session {
        access_token: read_cookie(jar, &ACCESS_TOKEN)?,
        refresh_token: read_cookie(jar, &REFRESH_TOKEN),
        user_id: read_cookie(jar, &USER_ID),
    })
}

// =============================================================================
// ERRORS
// =============================================================================

/// Backend failures keep their status and message; transport and decode
/// failures become 502.
fn error_response(err: &ApiError) -> Response {
    let status = match err {
        ApiError::Backend { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
        ApiError::MissingIdentifier(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_GATEWAY,
    };
    let message = match err.kind() {
        ErrorKind::Network | ErrorKind::Decode => "Authentication service unavailable".to_owned(),
        _ => err.user_message(),
    };
    (status, Json(json!({ "message": message, "errorCode": err.code() }))).into_response()
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub authenticated: bool,
    pub user_id: Option<String>,
}

/// `POST /api/auth/sign-in`: forward credentials, set session cookies.
pub async fn sign_in(State(state): State<AppState>, jar: CookieJar, Json(credentials): Json<SignInRequest>) -> Response {
    match auth_ops::request_sign_in(&state.api, &credentials).await {
        Ok(tokens) => {
            let session = auth_ops::session_from_tokens(&tokens, None);
            tracing::info!(user_id = session.user_id.as_deref().unwrap_or("-"), "admin signed in");
            let jar = write_session(jar, &session, state.cookie_secure);
            (jar, Json(json!({ "userId": session.user_id }))).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "sign-in rejected");
            error_response(&err)
        }
    }
}

/// `POST /api/auth/refresh`: rotate tokens from the `refreshToken` cookie.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(refresh_token) = read_cookie(&jar, &REFRESH_TOKEN) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "No refresh token" }))).into_response();
    };

    match auth_ops::request_refresh(&state.api, &refresh_token).await {
        Ok(tokens) => {
            let previous = Session {
                access_token: String::new(),
                refresh_token: Some(refresh_token),
                user_id: read_cookie(&jar, &USER_ID),
            };
            let session = auth_ops::session_from_tokens(&tokens, Some(&previous));
            let jar = write_session(jar, &session, state.cookie_secure);
            (jar, Json(json!({ "userId": session.user_id }))).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "token refresh rejected");
            error_response(&err)
        }
    }
}

/// `POST /api/auth/sign-out`: expire every session cookie.
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = SESSION_COOKIES
        .iter()
        .fold(jar, |jar, spec| jar.add(expired_cookie(spec, state.cookie_secure)));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/session`: whether the browser holds a session.
pub async fn session(jar: CookieJar) -> Json<SessionInfo> {
    let session = jar_session(&jar);
    Json(SessionInfo {
        authenticated: session.is_some(),
        user_id: session.and_then(|s| s.user_id),
    })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
