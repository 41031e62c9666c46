//! API connection: base URI, authentication headers, and status mapping.
//!
//! # Design
//! `Api` owns the pluggable transport and everything that is fixed for the
//! lifetime of a client: the token-derived header set, the base URI, and the
//! batch size used by bulk iteration. Entity mappers borrow it; it carries no
//! other state, so one `Api` can back any number of mappers.

use serde_json::Value;

use crate::attribute::AttributeManager;
use crate::contact::ContactManager;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::list::ListManager;
use crate::mapper::EntityMapper;

/// Production endpoint used when no base URI is given.
pub const DEFAULT_BASE_URI: &str = "https://api.getanewsletter.com/v3/";

/// Page size used by `EntityMapper::all` unless overridden.
pub const DEFAULT_BATCH_SIZE: u64 = 25;

/// Connection to the newsletter API.
pub struct Api {
    base_uri: String,
    batch_size: u64,
    headers: Vec<(String, String)>,
    transport: Box<dyn Transport>,
}

impl Api {
    /// Connect to the production endpoint with the given security token.
    pub fn new(token: &str, transport: Box<dyn Transport>) -> Self {
        Self::with_base_uri(token, DEFAULT_BASE_URI, transport)
    }

    /// Connect to an alternative endpoint (e.g. a staging or mock server).
    pub fn with_base_uri(token: &str, base_uri: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            base_uri: format!("{}/", base_uri.trim_end_matches('/')),
            batch_size: DEFAULT_BATCH_SIZE,
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Token {token}")),
            ],
            transport,
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Page size for bulk iteration. Values below 1 are pinned to 1.
    pub fn set_batch_size(&mut self, batch_size: u64) {
        self.batch_size = batch_size.max(1);
    }

    pub fn contacts(&self) -> ContactManager<'_> {
        EntityMapper::new(self)
    }

    pub fn lists(&self) -> ListManager<'_> {
        EntityMapper::new(self)
    }

    pub fn attributes(&self) -> AttributeManager<'_> {
        EntityMapper::new(self)
    }

    /// Make one call to the API.
    ///
    /// Appends `resource_path` to the base URI, attaches the fixed header
    /// set, runs the transport, and maps the status: 2xx is success, 404
    /// becomes `NotFound`, anything else becomes `RequestFailed` carrying the
    /// status and raw body.
    pub fn call(
        &self,
        method: HttpMethod,
        resource_path: &str,
        payload: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        let body = payload
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_uri, resource_path.trim_start_matches('/')),
            headers: self.headers.clone(),
            body,
        };

        let response = self.transport.call(request)?;
        match response.status {
            200..=299 => Ok(response),
            404 => Err(ApiError::NotFound),
            status => Err(ApiError::RequestFailed {
                status,
                body: response.body,
            }),
        }
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("base_uri", &self.base_uri)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;

    #[test]
    fn default_base_uri_is_production() {
        let api = Api::new("secret", Box::new(MockTransport::new()));
        assert_eq!(api.base_uri(), "https://api.getanewsletter.com/v3/");
    }

    #[test]
    fn base_uri_gains_exactly_one_trailing_slash() {
        let transport = Box::new(MockTransport::new());
        let api = Api::with_base_uri("secret", "http://localhost:3000", transport);
        assert_eq!(api.base_uri(), "http://localhost:3000/");

        let transport = Box::new(MockTransport::new());
        let api = Api::with_base_uri("secret", "http://localhost:3000///", transport);
        assert_eq!(api.base_uri(), "http://localhost:3000/");
    }

    #[test]
    fn every_request_carries_the_fixed_headers() {
        let transport = MockTransport::new();
        transport.push_response(200, "{}");
        let api = Api::with_base_uri("s3cr3t", "http://localhost", Box::new(transport.clone()));

        api.call(HttpMethod::Get, "contacts/a@b.se/", None).unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let headers = &requests[0].headers;
        assert!(headers.contains(&("Accept".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("Content-Type".to_string(), "application/json".to_string())));
        assert!(headers.contains(&("Authorization".to_string(), "Token s3cr3t".to_string())));
    }

    #[test]
    fn call_joins_base_uri_and_resource_path() {
        let transport = MockTransport::new();
        transport.push_response(200, "{}");
        let api = Api::with_base_uri("t", "http://localhost", Box::new(transport.clone()));

        api.call(HttpMethod::Get, "contacts/a@b.se/", None).unwrap();
        assert_eq!(transport.requests()[0].url, "http://localhost/contacts/a@b.se/");
    }

    #[test]
    fn status_404_maps_to_not_found() {
        let transport = MockTransport::new();
        transport.push_response(404, r#"{"detail":"Not found."}"#);
        let api = Api::with_base_uri("t", "http://localhost", Box::new(transport));

        let err = api.call(HttpMethod::Get, "contacts/x/", None).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn other_failures_carry_status_and_body() {
        let transport = MockTransport::new();
        transport.push_response(500, "boom");
        let api = Api::with_base_uri("t", "http://localhost", Box::new(transport));

        let err = api.call(HttpMethod::Get, "contacts/", None).unwrap_err();
        match err {
            ApiError::RequestFailed { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }

    #[test]
    fn payload_is_serialized_into_the_body() {
        let transport = MockTransport::new();
        transport.push_response(201, "{}");
        let api = Api::with_base_uri("t", "http://localhost", Box::new(transport.clone()));

        let payload = serde_json::json!({"email": "a@b.se"});
        api.call(HttpMethod::Post, "contacts/", Some(&payload)).unwrap();

        let body = transport.requests()[0].body.clone().unwrap();
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed, payload);
    }
}
