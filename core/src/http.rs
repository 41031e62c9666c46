//! HTTP boundary types and the pluggable blocking transport.
//!
//! # Design
//! Requests and responses are described as plain data with owned fields. The
//! library builds `HttpRequest` values and interprets `HttpResponse` values;
//! the actual network round-trip happens behind the `Transport` trait, so the
//! core stays deterministic and easy to test: unit tests plug in a recording
//! transport, integration tests plug in a real HTTP client.

use std::str::FromStr;

use crate::error::ApiError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Wire name of the method, e.g. `"PATCH"`.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    /// Parse a method name. Anything outside the supported verb set fails
    /// with `InvalidMethod` before any I/O can be attempted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(ApiError::InvalidMethod(other.to_string())),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Api::call`; a `Transport` implementation is responsible for
/// executing it and returning the corresponding `HttpResponse`.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// Status interpretation (2xx vs 404 vs anything else) belongs to the
/// library, not the transport: implementations return every status as data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Blocking transport executing one HTTP round-trip.
///
/// Implementations must return non-2xx responses as data rather than errors;
/// only failures below the HTTP layer (connection refused, timeouts, ...)
/// should surface as `ApiError::TransportError`.
pub trait Transport: Send + Sync {
    fn call(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}
