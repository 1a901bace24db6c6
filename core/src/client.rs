//! Request assembly, dispatch and response normalization for the CambioReal API.
//!
//! # Design
//! `ApiClient` holds only its `ClientConfig`. A `RequestBuilder` collects the
//! method, action, parameters and declared response type, and freezes them
//! into an immutable `Request`. Dispatch is split into `build_request`
//! (produces an `HttpRequest`) and `parse_response` (consumes an
//! `HttpResponse`); `send` chains both around a single `Transport` call.
//! Nothing is mutated along the way, so a `Request` can be sent again.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::{encode_path_segment, Params};
use crate::response::{ResponseBody, ResponseType};
use crate::transport::Transport;

/// Name the API server expects in the `User-Agent` header.
pub const LIBRARY_NAME: &str = "CAMBIOREAL";

/// Library version reported to the API server.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// `User-Agent` value sent with every request. The wording is part of the
/// client identification the server side matches on.
pub fn user_agent() -> String {
    format!("{LIBRARY_NAME} PHP Library {VERSION}")
}

/// A fully assembled API call. Built with `ApiClient::request`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: HttpMethod,
    target: String,
    params: Option<Params>,
    response_type: ResponseType,
}

impl Request {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Absolute target, before any token segment or query string is added.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// `None` until parameters have been supplied. An empty set still
    /// counts as supplied and clears the target's query on GET.
    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }
}

/// Fluent builder for `Request`.
///
/// Without `action` the target stays the bare base URL; the server decides
/// what that means. Without `method` the request is a GET.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    request: Request,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            request: Request {
                method: HttpMethod::default(),
                target: base_url.clone(),
                params: None,
                response_type: ResponseType::default(),
            },
            base_url,
        }
    }

    /// Replace the parameter set.
    pub fn params(mut self, params: impl Into<Params>) -> Self {
        self.request.params = Some(params.into());
        self
    }

    /// Add or overwrite a single parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.request
            .params
            .get_or_insert_with(Params::new)
            .insert(key, value);
        self
    }

    /// Replace the parameter set with the fields of a serializable value.
    pub fn params_from<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ApiError> {
        Ok(self.params(Params::from_serialize(value)?))
    }

    /// Set the method from its name. Fails on anything but GET or POST.
    pub fn method(self, method: &str) -> Result<Self, ApiError> {
        Ok(self.http_method(method.parse()?))
    }

    pub fn http_method(mut self, method: HttpMethod) -> Self {
        self.request.method = method;
        self
    }

    /// Set the target to the base URL followed by `action`.
    pub fn action(mut self, action: &str) -> Self {
        self.request.target = format!("{}{action}", self.base_url);
        self
    }

    pub fn response_type(mut self, response_type: impl Into<ResponseType>) -> Self {
        self.request.response_type = response_type.into();
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

/// Synchronous, stateless client for the CambioReal API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Start a request against this client's base URL.
    pub fn request(&self) -> RequestBuilder {
        RequestBuilder::new(self.config.base_url.as_str())
    }

    /// Lay out `request` on the wire: identification and credential headers,
    /// the token as a path segment, and the remaining parameters as a query
    /// string (GET) or form body (POST).
    ///
    /// Supplied GET parameters replace any query already present in the
    /// target; a request without parameters leaves the target untouched.
    pub fn build_request(&self, request: &Request) -> HttpRequest {
        let (token, params) = match &request.params {
            Some(params) => {
                let (token, rest) = params.split_token();
                (token, Some(rest))
            }
            None => (None, None),
        };

        let mut url = request.target.clone();
        if let Some(token) = token {
            url.push('/');
            url.push_str(&encode_path_segment(&token));
        }

        let mut headers = vec![
            ("User-Agent".to_string(), user_agent()),
            ("X-APP-ID".to_string(), self.config.app_id.clone()),
            ("X-APP-SECRET".to_string(), self.config.app_secret.clone()),
        ];

        let body = match request.method {
            HttpMethod::Get => {
                if let Some(params) = params {
                    if let Some(start) = url.find('?') {
                        url.truncate(start);
                    }
                    let query = params.to_query_string();
                    if !query.is_empty() {
                        url.push('?');
                        url.push_str(&query);
                    }
                }
                None
            }
            HttpMethod::Post => params.map(|params| {
                headers.push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
                params.to_form_body()
            }),
        };

        HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        }
    }

    /// Normalize a response according to the declared response type.
    ///
    /// An empty body is a `BadResponse` whatever the status code.
    pub fn parse_response(
        &self,
        request: &Request,
        response: HttpResponse,
    ) -> Result<ResponseBody, ApiError> {
        if response.body.is_empty() {
            warn!(status = response.status, "empty response body");
            return Err(ApiError::BadResponse {
                status: response.status,
            });
        }
        ResponseBody::decode(request.response_type, response.body)
    }

    /// Build, execute once over `transport`, and parse.
    pub fn send<T: Transport + ?Sized>(
        &self,
        request: &Request,
        transport: &T,
    ) -> Result<ResponseBody, ApiError> {
        let http = self.build_request(request);
        debug!(method = %http.method, url = %http.url, "dispatching request");
        let response = transport.execute(http)?;
        debug!(
            status = response.status,
            body_len = response.body.len(),
            "received response"
        );
        self.parse_response(request, response)
    }
}
