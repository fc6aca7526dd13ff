//! Routing guard middleware.
//!
//! Applies [`dashboard::guard::evaluate`] to every request. A session is
//! present when the `accessToken` cookie holds a non-empty value; the token
//! itself is not validated here, the backend rejects it if it is stale.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use dashboard::guard::{self, GuardDecision};
use dashboard::session::ACCESS_TOKEN;

use crate::state::AppState;

pub(crate) fn has_session(jar: &CookieJar) -> bool {
    jar.get(ACCESS_TOKEN.name)
        .map(Cookie::value)
        .is_some_and(|token| !token.is_empty())
}

pub async fn route_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    match guard::evaluate(path, has_session(&jar), &state.guard) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(%path, %target, "guard redirect");
            Redirect::temporary(target).into_response()
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
