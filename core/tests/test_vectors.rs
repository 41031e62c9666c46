//! Verify mapper operations against JSON test vectors in `test-vectors/`.
//!
//! Each vector case describes an input entity, the operation to run, the
//! request the mapper must produce, a simulated server response, and the
//! expected outcome. Request bodies are compared as parsed JSON (not raw
//! strings) to avoid false negatives from field-ordering differences.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use gan_core::{
    Api, ApiError, Attribute, Contact, Entity, EntityMapper, HttpMethod, HttpRequest,
    HttpResponse, List, Transport,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

/// Plays back queued responses and records every request. Clones share state.
#[derive(Clone, Default)]
struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    fn push_response(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        });
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn call(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::TransportError("no scripted response left".to_string()))
    }
}

fn assert_expected_error(name: &str, err: &ApiError, expected: &str) {
    let matched = match expected {
        "MissingRequiredField" => matches!(err, ApiError::MissingRequiredField { .. }),
        "NotFound" => matches!(err, ApiError::NotFound),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

fn run_vectors<E: Entity>(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = ScriptedTransport::default();
        if let Some(sim) = case.get("simulated_response") {
            transport.push_response(
                sim["status"].as_u64().unwrap() as u16,
                sim["body"].as_str().unwrap(),
            );
        }

        let api = Api::with_base_uri("token", BASE_URL, Box::new(transport.clone()));
        let mapper: EntityMapper<E> = EntityMapper::new(&api);

        let operation = case["operation"].as_str().unwrap();
        let result: Result<Value, ApiError> = if operation == "get" {
            mapper
                .get(case["id"].as_str().unwrap())
                .map(|entity| serde_json::to_value(entity).unwrap())
        } else {
            let mut entity: E = serde_json::from_value(case["entity"].clone()).unwrap();
            entity.set_persisted(case["persisted"].as_bool().unwrap_or(false));
            match operation {
                "save" => mapper
                    .save(&entity)
                    .map(|saved| serde_json::to_value(saved).unwrap()),
                "overwrite" => mapper
                    .overwrite(&entity)
                    .map(|saved| serde_json::to_value(saved).unwrap()),
                "delete" => mapper
                    .delete(&entity)
                    .map(|response| serde_json::json!({"status": response.status})),
                other => panic!("{name}: unknown operation: {other}"),
            }
        };

        // Verify the request that went out (or that none did).
        if let Some(expected_req) = case.get("expected_request") {
            let requests = transport.requests();
            assert_eq!(requests.len(), 1, "{name}: request count");
            let request = &requests[0];
            let expected_method: HttpMethod =
                expected_req["method"].as_str().unwrap().parse().unwrap();
            assert_eq!(request.method, expected_method, "{name}: method");
            assert_eq!(
                request.url,
                format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()),
                "{name}: url"
            );
            if let Some(expected_body) = expected_req.get("body") {
                let body: Value =
                    serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
                assert_eq!(&body, expected_body, "{name}: body");
            }
        } else {
            assert!(
                transport.requests().is_empty(),
                "{name}: expected no request"
            );
        }

        // Verify the outcome.
        if let Some(expected_error) = case.get("expected_error") {
            let err = result.expect_err(name);
            assert_expected_error(name, &err, expected_error.as_str().unwrap());
        } else {
            let value = result.unwrap_or_else(|err| panic!("{name}: unexpected error {err:?}"));
            for (key, expected) in case["expected"].as_object().unwrap() {
                assert_eq!(&value[key], expected, "{name}: result field {key}");
            }
        }
    }
}

#[test]
fn contact_test_vectors() {
    run_vectors::<Contact>(include_str!("../../test-vectors/contacts.json"));
}

#[test]
fn list_test_vectors() {
    run_vectors::<List>(include_str!("../../test-vectors/lists.json"));
}

#[test]
fn attribute_test_vectors() {
    run_vectors::<Attribute>(include_str!("../../test-vectors/attributes.json"));
}
