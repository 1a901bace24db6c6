//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and parses `HttpResponse` values; moving bytes
//! over the network is the job of a `Transport` implementation (see
//! `transport.rs`) or of a host that performs the round-trip itself.
//!
//! All fields use owned types (`String`, `Vec`) so values can be handed to
//! any transport without lifetime concerns.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// HTTP method accepted by the CambioReal API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; anything other than GET or POST is a caller bug.
impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            _ => Err(ApiError::InvalidInput(format!(
                "the HTTP request doesn't accept {s} requests"
            ))),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_request`. `url` is absolute and already carries
/// the query string for GET requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` (or by the host) and handed to
/// `ApiClient::parse_response`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing_ignores_case() {
        for s in ["get", "GET", "Get", "gEt"] {
            assert_eq!(s.parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        }
        for s in ["post", "POST", "Post"] {
            assert_eq!(s.parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        }
    }

    #[test]
    fn method_parsing_rejects_others() {
        for s in ["PUT", "delete", "", " get", "GETS", "patch"] {
            let err = s.parse::<HttpMethod>().unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)), "{s:?}");
        }
    }

    #[test]
    fn method_displays_upper_case() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost".to_string(),
            headers: vec![("X-APP-ID".to_string(), "id".to_string())],
            body: None,
        };
        assert_eq!(req.header("x-app-id"), Some("id"));
        assert_eq!(req.header("user-agent"), None);
    }
}
