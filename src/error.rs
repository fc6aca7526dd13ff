//! Uniform error type for backend calls.
//!
//! DESIGN
//! ======
//! Every failure a resource operation can hit collapses into [`ApiError`].
//! It is `Clone` because an in-flight fetch result is shared between every
//! reader of the same cache key, so the variants carry rendered strings rather
//! than the underlying `reqwest`/`serde_json` errors.
//!
//! Classification into [`ErrorKind`] prefers the backend's structured
//! `errorCode`. Message inspection is kept only as a fallback for endpoints
//! that do not send a code.

use serde::Deserialize;

/// Error codes the backend uses for permission failures.
const AUTHORIZATION_CODES: &[&str] = &[
    "FORBIDDEN",
    "ACCESS_DENIED",
    "PERMISSION_DENIED",
    "UNAUTHORIZED",
    "INSUFFICIENT_PERMISSIONS",
];

/// Error codes the backend uses for rejected payloads.
const VALIDATION_CODES: &[&str] = &["VALIDATION_ERROR", "BAD_REQUEST"];

/// Message fragments that older endpoints use to signal permission failures.
const AUTHORIZATION_MESSAGE_HINTS: &[&str] = &["Permission", "required"];

/// One field-level validation message from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("{message}")]
    Backend {
        status: u16,
        message: String,
        code: Option<String>,
        field_errors: Vec<FieldError>,
    },
    #[error("missing {0}")]
    MissingIdentifier(&'static str),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid request body: {0}")]
    Encode(String),
    #[error("http client build failed: {0}")]
    ClientBuild(String),
}

/// Coarse error taxonomy used to pick how a failure is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Validation,
    Authorization,
    MissingIdentifier,
    Backend,
    Decode,
}

impl ApiError {
    /// Build a backend error from a status and message with no extra detail.
    #[must_use]
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend { status, message: message.into(), code: None, field_errors: Vec::new() }
    }

    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::ClientBuild(_) => ErrorKind::Network,
            Self::MissingIdentifier(_) => ErrorKind::MissingIdentifier,
            Self::Decode(_) | Self::Encode(_) => ErrorKind::Decode,
            Self::Backend { status, message, code, field_errors } => {
                classify_backend(*status, message, code.as_deref(), field_errors)
            }
        }
    }

    /// HTTP status reported by the backend, if the request got that far.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured backend error code, if one was supplied.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Text suitable for a notification.
    ///
    /// Validation errors concatenate their field messages; everything else
    /// uses the error's display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { field_errors, .. } if !field_errors.is_empty() => field_errors
                .iter()
                .map(|f| format!("{}: {}", f.field, f.message))
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        }
    }
}

fn classify_backend(status: u16, message: &str, code: Option<&str>, field_errors: &[FieldError]) -> ErrorKind {
    if let Some(code) = code {
        if AUTHORIZATION_CODES.contains(&code) {
            return ErrorKind::Authorization;
        }
        if VALIDATION_CODES.contains(&code) {
            return ErrorKind::Validation;
        }
    }
    if !field_errors.is_empty() {
        return ErrorKind::Validation;
    }
    if status == 401 || status == 403 {
        return ErrorKind::Authorization;
    }
    if code.is_none()
        && AUTHORIZATION_MESSAGE_HINTS
            .iter()
            .any(|hint| message.contains(hint))
    {
        return ErrorKind::Authorization;
    }
    ErrorKind::Backend
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Encode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
