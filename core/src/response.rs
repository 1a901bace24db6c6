//! Declared response shapes and the normalized result of a dispatch.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// How the caller expects the response body to be interpreted.
///
/// Declared by the caller, never inferred from the response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    #[default]
    Raw,
    Json,
}

/// `"JSON"` in any casing selects `Json`; every other string means `Raw`.
impl From<&str> for ResponseType {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            ResponseType::Json
        } else {
            ResponseType::Raw
        }
    }
}

/// A non-empty response body, shaped according to the declared `ResponseType`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Json(Value),
}

impl ResponseBody {
    /// Interpret `body` as `kind` dictates. The body must be non-empty.
    pub(crate) fn decode(kind: ResponseType, body: String) -> Result<Self, ApiError> {
        match kind {
            ResponseType::Raw => Ok(ResponseBody::Text(body)),
            ResponseType::Json => serde_json::from_str(&body)
                .map(ResponseBody::Json)
                .map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Deserialize into a caller type. Text bodies are parsed as JSON first.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let result = match self {
            ResponseBody::Json(value) => serde_json::from_value(value),
            ResponseBody::Text(text) => serde_json::from_str(&text),
        };
        result.map_err(|e| ApiError::Decode(e.to_string()))
    }
}
