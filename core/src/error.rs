//! Error types for the newsletter API client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `RequestFailed` with the raw
//! status code and body for debugging. Pre-flight failures (a missing lookup
//! field, an invalid iteration range, an unknown HTTP verb) have their own
//! variants and are guaranteed to occur before any network call.

use std::fmt;

/// Errors returned by the client library.
#[derive(Debug)]
pub enum ApiError {
    /// An HTTP verb outside GET/POST/PUT/PATCH/DELETE was requested.
    /// Raised before any network I/O.
    InvalidMethod(String),

    /// A lookup-dependent operation (update, overwrite, delete) was attempted
    /// on an entity whose lookup field is empty. Raised before any network
    /// call; `field` names the missing field.
    MissingRequiredField { field: &'static str },

    /// The server returned 404: the requested resource does not exist.
    NotFound,

    /// The server returned a non-2xx status other than 404.
    RequestFailed { status: u16, body: String },

    /// A paginated traversal was attempted with no corresponding
    /// continuation link.
    Exhausted,

    /// Bulk iteration was requested over a malformed index range.
    InvalidRange { start: u64, stop: u64 },

    /// The request payload could not be serialized to JSON.
    SerializationError(String),

    /// The response body could not be deserialized into the expected shape.
    DeserializationError(String),

    /// The transport failed below the HTTP layer (connection, timeout, ...).
    TransportError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidMethod(method) => {
                write!(f, "{method} is not a valid HTTP method")
            }
            ApiError::MissingRequiredField { field } => {
                write!(f, "missing required field: {field}")
            }
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::RequestFailed { status, body } => {
                write!(f, "HTTP {status}: {body}")
            }
            ApiError::Exhausted => write!(f, "no more pages in this direction"),
            ApiError::InvalidRange { start, stop } => {
                write!(f, "invalid iteration range: start {start} > stop {stop}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::TransportError(msg) => write!(f, "transport failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
