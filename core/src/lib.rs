//! Synchronous client core for the getanewsletter.com REST API.
//!
//! # Overview
//! Maps domain entities (contacts, lists, attributes) onto HTTP CRUD
//! operations against the JSON API: authentication headers, request/response
//! (de)serialization, cursor pagination, and a persisted-state model so
//! callers never hand-write HTTP calls.
//!
//! # Design
//! - `Api` holds the connection configuration; the network itself sits
//!   behind the blocking `Transport` trait, so the library is deterministic
//!   under test and agnostic of the HTTP client used.
//! - `EntityMapper` is the data mapper: it turns a static `EntityDescriptor`
//!   (base path, writable fields, lookup field) into correct verbs, paths,
//!   and payloads. Entity kinds are configuration plus optional `normalize`
//!   overrides, not subclasses.
//! - Searches come back as a `PaginatedResultSet` that follows the server's
//!   continuation links; `EntityMapper::all` walks a whole collection lazily.
//! - No caching, no retries: every error surfaces directly to the caller.

pub mod api;
pub mod attribute;
pub mod contact;
pub mod entity;
pub mod error;
pub mod http;
pub mod iter;
pub mod list;
pub mod mapper;
pub mod pagination;

pub use api::{Api, DEFAULT_BASE_URI, DEFAULT_BATCH_SIZE};
pub use attribute::{Attribute, AttributeManager};
pub use contact::{Contact, ContactManager, Subscription};
pub use entity::{Entity, EntityDescriptor};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use iter::AllIter;
pub use list::{List, ListManager};
pub use mapper::EntityMapper;
pub use pagination::PaginatedResultSet;
