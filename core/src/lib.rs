//! Synchronous request layer for the CambioReal currency-exchange API.
//!
//! # Overview
//! Assembles an API call (method, action, parameters, declared response
//! type), lays it out on the wire with the client's credentials, executes it
//! once over a `Transport`, and returns either the raw body text or the
//! decoded JSON value.
//!
//! # Design
//! - `ApiClient` is stateless; it holds only its `ClientConfig`.
//! - `Request` is immutable once built, so the same request can be
//!   dispatched any number of times.
//! - `build_request` / `parse_response` expose the I/O boundary for hosts
//!   that execute HTTP themselves; `send` chains them around a `Transport`.
//!
//! ```no_run
//! use cambioreal_core::{ApiClient, ClientConfig, UreqTransport};
//!
//! # fn main() -> Result<(), cambioreal_core::ApiError> {
//! let client = ApiClient::new(ClientConfig::from_env()?);
//! let request = client
//!     .request()
//!     .method("GET")?
//!     .action("/service/v1/quote")
//!     .param("currency", "USD")
//!     .param("amount", 100)
//!     .response_type("JSON")
//!     .build();
//! let quote = client.send(&request, &UreqTransport::new())?;
//! println!("{quote:?}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod response;
pub mod transport;

pub use client::{ApiClient, Request, RequestBuilder};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::Params;
pub use response::{ResponseBody, ResponseType};
pub use transport::{Transport, UreqTransport};
