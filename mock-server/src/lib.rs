//! In-memory mock of the getanewsletter.com REST API.
//!
//! Serves the three resources the client library speaks to (contacts,
//! lists, attributes) with the real service's conventions: token
//! authentication, trailing-slash resource paths, partial updates via PATCH,
//! and the `{count, next, previous, results}` pagination envelope on every
//! collection endpoint. State lives in process memory; each `app()` starts
//! empty.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Fixed timestamp stamped onto created/updated records.
const TIMESTAMP: &str = "2026-01-01T00:00:00";

/// Host baked into resource URLs and continuation links. Clients are expected
/// to read only the query string of a continuation link, so the authority
/// part is arbitrary.
const BASE: &str = "http://testserver";

fn timestamp() -> String {
    TIMESTAMP.to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub lists: Vec<Value>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default = "timestamp")]
    pub created: String,
    #[serde(default = "timestamp")]
    pub updated: String,
}

#[derive(Deserialize)]
pub struct UpdateContact {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub attributes: Option<Map<String, Value>>,
    pub lists: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct List {
    #[serde(default)]
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub url: String,
    #[serde(default = "timestamp")]
    pub created: String,
    #[serde(default)]
    pub subscribers: String,
    #[serde(default)]
    pub subscribers_count: u64,
    #[serde(default)]
    pub active_subscribers_count: u64,
    #[serde(default)]
    pub responders_count: u64,
    #[serde(default)]
    pub responders: Vec<Value>,
}

#[derive(Deserialize)]
pub struct UpdateList {
    pub email: Option<String>,
    pub name: Option<String>,
    pub sender: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub usage_count: u64,
}

#[derive(Deserialize)]
pub struct UpdateAttribute {
    pub name: Option<String>,
}

/// Pagination envelope served by every collection endpoint.
#[derive(Serialize)]
struct Envelope {
    count: u64,
    next: Option<String>,
    previous: Option<String>,
    results: Vec<Value>,
}

#[derive(Default)]
pub struct Store {
    contacts: BTreeMap<String, Contact>,
    lists: BTreeMap<String, List>,
    attributes: BTreeMap<String, Attribute>,
    next_list_hash: u64,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/contacts/", get(list_contacts).post(create_contact))
        .route(
            "/contacts/{email}/",
            get(get_contact)
                .patch(patch_contact)
                .put(put_contact)
                .delete(delete_contact),
        )
        .route("/lists/", get(list_lists).post(create_list))
        .route(
            "/lists/{hash}/",
            get(get_list).patch(patch_list).put(put_list).delete(delete_list),
        )
        .route("/attributes/", get(list_attributes).post(create_attribute))
        .route(
            "/attributes/{code}/",
            get(get_attribute)
                .patch(patch_attribute)
                .put(put_attribute)
                .delete(delete_attribute),
        )
        .layer(middleware::from_fn(require_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Every route requires `Authorization: Token <anything>`.
async fn require_token(request: Request, next: Next) -> Result<Response, StatusCode> {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Token "));
    if authorized {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

/// Slice `items` into one page of the envelope, with absolute continuation
/// links for the neighboring pages.
fn paginate(path: &str, params: &HashMap<String, String>, items: Vec<Value>) -> Envelope {
    let parse = |key: &str| params.get(key).and_then(|v| v.parse::<usize>().ok());
    let per = parse("paginate_by").unwrap_or(25).max(1);
    let page = parse("page").unwrap_or(1).max(1);

    let count = items.len();
    let results = items.into_iter().skip((page - 1) * per).take(per).collect();
    let link = |p: usize| format!("{BASE}{path}?page={p}&paginate_by={per}");

    Envelope {
        count: count as u64,
        next: (page * per < count).then(|| link(page + 1)),
        previous: (page > 1).then(|| link(page - 1)),
        results,
    }
}

fn to_values<T: Serialize>(items: impl Iterator<Item = T>) -> Vec<Value> {
    items
        .map(|item| serde_json::to_value(item).expect("record serializes"))
        .collect()
}

// --- contacts ---

async fn list_contacts(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Envelope> {
    let store = db.read().await;
    let matches = store.contacts.values().filter(|contact| {
        params
            .get("search_email")
            .is_none_or(|needle| contact.email.contains(needle.as_str()))
    });
    Json(paginate("/contacts/", &params, to_values(matches)))
}

async fn create_contact(
    State(db): State<Db>,
    Json(mut input): Json<Contact>,
) -> Result<(StatusCode, Json<Contact>), StatusCode> {
    if input.email.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    input.url = format!("{BASE}/contacts/{}/", input.email);
    let mut store = db.write().await;
    store.contacts.insert(input.email.clone(), input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_contact(
    State(db): State<Db>,
    Path(email): Path<String>,
) -> Result<Json<Contact>, StatusCode> {
    let store = db.read().await;
    store.contacts.get(&email).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn patch_contact(
    State(db): State<Db>,
    Path(email): Path<String>,
    Json(input): Json<UpdateContact>,
) -> Result<Json<Contact>, StatusCode> {
    let mut store = db.write().await;
    let mut contact = store.contacts.remove(&email).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(email) = input.email {
        contact.email = email;
    }
    if let Some(first_name) = input.first_name {
        contact.first_name = first_name;
    }
    if let Some(last_name) = input.last_name {
        contact.last_name = last_name;
    }
    if let Some(attributes) = input.attributes {
        contact.attributes = attributes;
    }
    if let Some(lists) = input.lists {
        contact.lists = lists;
    }
    contact.updated = timestamp();
    contact.url = format!("{BASE}/contacts/{}/", contact.email);
    store.contacts.insert(contact.email.clone(), contact.clone());
    Ok(Json(contact))
}

async fn put_contact(
    State(db): State<Db>,
    Path(email): Path<String>,
    Json(mut input): Json<Contact>,
) -> Result<Json<Contact>, StatusCode> {
    let mut store = db.write().await;
    store.contacts.remove(&email).ok_or(StatusCode::NOT_FOUND)?;
    input.url = format!("{BASE}/contacts/{}/", input.email);
    input.updated = timestamp();
    store.contacts.insert(input.email.clone(), input.clone());
    Ok(Json(input))
}

async fn delete_contact(
    State(db): State<Db>,
    Path(email): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .contacts
        .remove(&email)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

// --- lists ---

async fn list_lists(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Envelope> {
    let store = db.read().await;
    Json(paginate("/lists/", &params, to_values(store.lists.values())))
}

async fn create_list(
    State(db): State<Db>,
    Json(mut input): Json<List>,
) -> (StatusCode, Json<List>) {
    let mut store = db.write().await;
    store.next_list_hash += 1;
    input.hash = format!("h{:06}", store.next_list_hash);
    input.url = format!("{BASE}/lists/{}/", input.hash);
    input.subscribers = format!("{BASE}/lists/{}/subscribers/", input.hash);
    store.lists.insert(input.hash.clone(), input.clone());
    (StatusCode::CREATED, Json(input))
}

async fn get_list(
    State(db): State<Db>,
    Path(hash): Path<String>,
) -> Result<Json<List>, StatusCode> {
    let store = db.read().await;
    store.lists.get(&hash).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn patch_list(
    State(db): State<Db>,
    Path(hash): Path<String>,
    Json(input): Json<UpdateList>,
) -> Result<Json<List>, StatusCode> {
    let mut store = db.write().await;
    let list = store.lists.get_mut(&hash).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(email) = input.email {
        list.email = email;
    }
    if let Some(name) = input.name {
        list.name = name;
    }
    if let Some(sender) = input.sender {
        list.sender = sender;
    }
    if let Some(description) = input.description {
        list.description = description;
    }
    Ok(Json(list.clone()))
}

async fn put_list(
    State(db): State<Db>,
    Path(hash): Path<String>,
    Json(mut input): Json<List>,
) -> Result<Json<List>, StatusCode> {
    let mut store = db.write().await;
    store.lists.remove(&hash).ok_or(StatusCode::NOT_FOUND)?;
    input.hash = hash.clone();
    input.url = format!("{BASE}/lists/{hash}/");
    input.subscribers = format!("{BASE}/lists/{hash}/subscribers/");
    store.lists.insert(hash, input.clone());
    Ok(Json(input))
}

async fn delete_list(
    State(db): State<Db>,
    Path(hash): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .lists
        .remove(&hash)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

// --- attributes ---

/// The real service derives the lookup code from the attribute name.
fn attribute_code(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

async fn list_attributes(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Envelope> {
    let store = db.read().await;
    Json(paginate(
        "/attributes/",
        &params,
        to_values(store.attributes.values()),
    ))
}

async fn create_attribute(
    State(db): State<Db>,
    Json(mut input): Json<Attribute>,
) -> Result<(StatusCode, Json<Attribute>), StatusCode> {
    if input.name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    input.code = attribute_code(&input.name);
    input.url = format!("{BASE}/attributes/{}/", input.code);
    let mut store = db.write().await;
    store.attributes.insert(input.code.clone(), input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn get_attribute(
    State(db): State<Db>,
    Path(code): Path<String>,
) -> Result<Json<Attribute>, StatusCode> {
    let store = db.read().await;
    store
        .attributes
        .get(&code)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn patch_attribute(
    State(db): State<Db>,
    Path(code): Path<String>,
    Json(input): Json<UpdateAttribute>,
) -> Result<Json<Attribute>, StatusCode> {
    let mut store = db.write().await;
    let attribute = store.attributes.get_mut(&code).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        attribute.name = name;
    }
    Ok(Json(attribute.clone()))
}

async fn put_attribute(
    State(db): State<Db>,
    Path(code): Path<String>,
    Json(mut input): Json<Attribute>,
) -> Result<Json<Attribute>, StatusCode> {
    let mut store = db.write().await;
    store.attributes.remove(&code).ok_or(StatusCode::NOT_FOUND)?;
    input.code = code.clone();
    input.url = format!("{BASE}/attributes/{code}/");
    store.attributes.insert(code, input.clone());
    Ok(Json(input))
}

async fn delete_attribute(
    State(db): State<Db>,
    Path(code): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .attributes
        .remove(&code)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_deserializes_with_defaults() {
        let contact: Contact = serde_json::from_str(r#"{"email":"a@b.se"}"#).unwrap();
        assert_eq!(contact.email, "a@b.se");
        assert!(contact.first_name.is_empty());
        assert!(contact.attributes.is_empty());
        assert!(contact.lists.is_empty());
        assert!(contact.active);
        assert_eq!(contact.created, TIMESTAMP);
    }

    #[test]
    fn contact_rejects_missing_email() {
        let result: Result<Contact, _> = serde_json::from_str(r#"{"first_name":"A"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn attribute_code_is_a_lowercase_slug() {
        assert_eq!(attribute_code("Shoe Size"), "shoe-size");
        assert_eq!(attribute_code("  City  "), "city");
    }

    #[test]
    fn envelope_links_bracket_the_current_page() {
        let params =
            HashMap::from([("page".to_string(), "2".to_string()), ("paginate_by".to_string(), "2".to_string())]);
        let items: Vec<Value> = (0..5).map(|i| serde_json::json!({"i": i})).collect();
        let envelope = paginate("/contacts/", &params, items);

        assert_eq!(envelope.count, 5);
        assert_eq!(envelope.results.len(), 2);
        assert_eq!(envelope.results[0]["i"], 2);
        assert_eq!(
            envelope.next.as_deref(),
            Some("http://testserver/contacts/?page=3&paginate_by=2")
        );
        assert_eq!(
            envelope.previous.as_deref(),
            Some("http://testserver/contacts/?page=1&paginate_by=2")
        );
    }

    #[test]
    fn envelope_omits_absent_neighbors() {
        let params = HashMap::new();
        let items: Vec<Value> = (0..3).map(|i| serde_json::json!({"i": i})).collect();
        let envelope = paginate("/contacts/", &params, items);
        assert!(envelope.next.is_none());
        assert!(envelope.previous.is_none());
    }
}
