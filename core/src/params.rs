//! Request parameters and their wire encoding.
//!
//! # Design
//! The API server parses parameters the way PHP's `http_build_query` writes
//! them, so nested values are flattened into bracketed keys (`a[b]=1`,
//! `a[0]=1`), booleans become `1`/`0` and nulls are dropped. Insertion order
//! is preserved.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Reserved parameter that is sent as a path segment instead of a field.
pub const TOKEN_KEY: &str = "token";

/// Ordered mapping from parameter name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Build parameters from any value that serializes to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(other) => Err(ApiError::InvalidInput(format!(
                "parameters must serialize to an object, got {other}"
            ))),
            Err(e) => Err(ApiError::InvalidInput(e.to_string())),
        }
    }

    /// Separate the reserved `token` from the remaining parameters.
    ///
    /// A `null` token counts as absent and stays in the returned set, where
    /// encoding drops it anyway.
    pub fn split_token(&self) -> (Option<String>, Params) {
        let mut rest = self.0.clone();
        match rest.get(TOKEN_KEY).and_then(scalar_text) {
            Some(token) => {
                rest.shift_remove(TOKEN_KEY);
                (Some(token), Params(rest))
            }
            None => (None, Params(rest)),
        }
    }

    /// `key=value` pairs for a URL query, percent-encoded per RFC 3986.
    pub fn to_query_string(&self) -> String {
        self.encode(false)
    }

    /// `application/x-www-form-urlencoded` body; spaces become `+`, `~` becomes `%7E`.
    pub fn to_form_body(&self) -> String {
        self.encode(true)
    }

    fn encode(&self, plus_for_space: bool) -> String {
        let mut pairs = Vec::new();
        for (key, value) in &self.0 {
            flatten(key.clone(), value, &mut pairs);
        }
        pairs
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    encode_component(k, plus_for_space),
                    encode_component(v, plus_for_space)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn flatten(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten(format!("{key}[{i}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (k, item) in map {
                flatten(format!("{key}[{k}]"), item, out);
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                out.push((key, text));
            }
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some("0".to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        composite => Some(composite.to_string()),
    }
}

/// Form bodies follow RFC 1738 as PHP writes them: `+` for space and `~`
/// escaped. Queries follow RFC 3986.
fn encode_component(s: &str, plus_for_space: bool) -> String {
    let encoded = urlencoding::encode(s);
    if plus_for_space {
        encoded.replace("%20", "+").replace('~', "%7E")
    } else {
        encoded.into_owned()
    }
}

/// Percent-encode `segment` for use in a URL path.
///
/// Unreserved characters, sub-delims, `:`, `@`, `/` and well-formed `%XX`
/// escapes pass through; everything else is encoded as UTF-8 bytes.
pub fn encode_path_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = String::with_capacity(segment.len());
    for (i, c) in segment.char_indices() {
        let keep = match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => true,
            '-' | '.' | '_' | '~' => true,
            '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' => true,
            ':' | '@' | '/' => true,
            '%' => {
                bytes.len() > i + 2
                    && bytes[i + 1].is_ascii_hexdigit()
                    && bytes[i + 2].is_ascii_hexdigit()
            }
            _ => false,
        };
        if keep {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}
