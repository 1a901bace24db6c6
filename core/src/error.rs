//! Error types for the CambioReal request layer.
//!
//! # Design
//! `InvalidInput` is raised while a request is being assembled, everything
//! else while it is dispatched. `BadResponse` is returned for every empty
//! body regardless of status, so a 204 and a bodiless 500 look the same to
//! callers.

use thiserror::Error;

/// Errors returned by `RequestBuilder` setters and `ApiClient::send`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller assembled a request the API cannot accept.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The server answered with an empty body.
    #[error("bad HTTP request: {status}")]
    BadResponse { status: u16 },

    /// A JSON response was declared but the body is not valid JSON.
    #[error("response decoding failed: {0}")]
    Decode(String),

    /// The transport could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body is larger than the transport's read limit.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: u64 },

    /// A required configuration value is absent.
    #[error("missing configuration value {0}")]
    MissingConfig(&'static str),
}
