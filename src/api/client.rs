//! Authenticated JSON client for the admin backend.
//!
//! DESIGN
//! ======
//! One `reqwest::Client` is shared by every clone of [`ApiClient`]. Each
//! request reads the session cookies at send time, so a sign-in or sign-out
//! applies to the next request without rebuilding the client.
//!
//! ERROR HANDLING
//! ==============
//! No retries. A non-success status becomes [`ApiError::Backend`] with the
//! message from the JSON error body when there is one, else a status-based
//! message. An envelope that reports `success: false` is an error even when
//! the status is 2xx.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::envelope::{Envelope, ErrorBody, FieldErrors};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::session::{self, CookieStore};

/// Header carrying the signed-in admin's id.
pub const ADMIN_USER_HEADER: &str = "x-admin-user-id";

// =============================================================================
// REQUEST
// =============================================================================

pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// A backend call: method, path relative to the base URL, query and body.
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self { method, path, query: Vec::new(), body: RequestBody::Empty }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Encode`] if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    cookies: Arc<dyn CookieStore>,
}

impl ApiClient {
    /// Build a client for `config`, authenticating from `cookies`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, cookies: Arc<dyn CookieStore>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: Arc::from(config.base_url.as_str()), cookies })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookie store the client authenticates from.
    #[must_use]
    pub fn cookies(&self) -> &Arc<dyn CookieStore> {
        &self.cookies
    }

    /// Send `request` and deserialize the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success response, or a
    /// payload that does not match `T`.
    pub async fn send_data<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let payload = self.send_raw(request).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send `request` and return the unwrapped JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn send_raw(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();

        let response = self.build(request).send().await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "backend request failed");
            ApiError::from(e)
        })?;
        let status = response.status();
        let bytes = response.bytes().await?;
        tracing::debug!(%method, %path, status = status.as_u16(), "backend response");

        if !status.is_success() {
            return Err(error_from_body(status, &bytes));
        }
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?
        };
        unwrap_envelope(status, body)
    }

    fn build(&self, request: ApiRequest) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method, url)
            .headers(self.auth_headers());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        }
    }

    /// Bearer and admin-identity headers for the current session. Missing
    /// cookies are omitted; the backend rejects the request if it needs them.
    pub(crate) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = session::access_token(self.cookies.as_ref()) {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!("access token is not a valid header value; sending without it"),
            }
        }
        if let Some(user_id) = session::user_id(self.cookies.as_ref()) {
            match HeaderValue::from_str(&user_id) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static(ADMIN_USER_HEADER), value);
                }
                Err(_) => tracing::warn!("user id is not a valid header value; sending without it"),
            }
        }
        headers
    }
}

fn error_from_body(status: StatusCode, bytes: &[u8]) -> ApiError {
    let body: ErrorBody = serde_json::from_slice(bytes).unwrap_or_default();
    let message = body
        .message()
        .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
    ApiError::Backend {
        status: status.as_u16(),
        message,
        code: body.error_code,
        field_errors: body
            .errors
            .map(FieldErrors::into_vec)
            .unwrap_or_default(),
    }
}

fn unwrap_envelope(status: StatusCode, body: Value) -> Result<Value, ApiError> {
    if !Envelope::detect(&body) {
        return Ok(body);
    }
    let envelope: Envelope = serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if envelope.success {
        return Ok(envelope.data);
    }
    let message = envelope
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Request was not successful".to_owned());
    Err(ApiError::Backend {
        status: envelope.status_code.unwrap_or(status.as_u16()),
        message,
        code: envelope.error_code,
        field_errors: Vec::new(),
    })
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
