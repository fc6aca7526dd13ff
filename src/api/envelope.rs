//! Backend response shapes.
//!
//! Most endpoints wrap their payload as
//! `{ success, message, data, timestamp, statusCode, errorCode }`; list
//! endpoints put a [`Page`] in `data`. Error bodies reuse the same fields and
//! may add per-field validation errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FieldError;

/// Standard response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl Envelope {
    /// Recognise an envelope by its boolean `success` field.
    #[must_use]
    pub fn detect(body: &Value) -> bool {
        body.get("success").is_some_and(Value::is_boolean)
    }
}

/// Paginated list payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageInfo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

/// Validation errors arrive either as `{field: message}` or as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FieldErrors {
    List(Vec<FieldError>),
    Map(std::collections::BTreeMap<String, String>),
}

impl FieldErrors {
    pub(crate) fn into_vec(self) -> Vec<FieldError> {
        match self {
            Self::List(list) => list,
            Self::Map(map) => map
                .into_iter()
                .map(|(field, message)| FieldError { field, message })
                .collect(),
        }
    }
}

impl ErrorBody {
    /// Best human-readable message, ignoring blank strings.
    pub(crate) fn message(&self) -> Option<String> {
        [&self.message, &self.error]
            .into_iter()
            .flatten()
            .map(|m| m.trim())
            .find(|m| !m.is_empty())
            .map(str::to_owned)
    }
}
