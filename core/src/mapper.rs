//! The entity-mapping engine: one place that knows how to turn entity data
//! into wire operations for an entity kind.
//!
//! # Design
//! `EntityMapper` follows the data-mapper pattern: it is a stateless value
//! (an `&Api` plus the entity kind) that translates CRUD intents into
//! transport calls. The HTTP verb is chosen from the operation and the
//! entity's persisted state (POST creates at the collection endpoint, PATCH
//! partially updates, PUT overwrites), and every lookup-dependent operation
//! fails with `MissingRequiredField` before any network call when the
//! entity's identity field is unset.

use std::marker::PhantomData;

use serde_json::Value;

use crate::api::Api;
use crate::entity::Entity;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::iter::AllIter;
use crate::pagination::PaginatedResultSet;

/// Maps one entity kind onto the REST API.
pub struct EntityMapper<'a, E: Entity> {
    api: &'a Api,
    _kind: PhantomData<E>,
}

impl<E: Entity> Clone for EntityMapper<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: Entity> Copy for EntityMapper<'_, E> {}

impl<'a, E: Entity> EntityMapper<'a, E> {
    pub fn new(api: &'a Api) -> Self {
        Self {
            api,
            _kind: PhantomData,
        }
    }

    pub(crate) fn api(&self) -> &'a Api {
        self.api
    }

    /// A fresh, unpersisted entity of this kind.
    pub fn create(&self) -> E {
        E::default()
    }

    /// Singular resource path: `<base_path>/<id>/`. Pure, no I/O.
    pub fn resource_path(&self, id: &str) -> String {
        format!(
            "{}/{}/",
            E::descriptor().base_path.trim_end_matches('/'),
            id.trim().trim_matches('/')
        )
    }

    /// Collection resource path: `<base_path>/`.
    pub fn collection_path(&self) -> String {
        format!("{}/", E::descriptor().base_path.trim_end_matches('/'))
    }

    /// Singular path addressing `entity` through its lookup field.
    ///
    /// Fails with `MissingRequiredField` (naming the field) when the lookup
    /// field is unset or empty; no network call has happened at that point.
    pub fn lookup_path(&self, entity: &E) -> Result<String, ApiError> {
        let id = entity.lookup_value().ok_or(ApiError::MissingRequiredField {
            field: E::descriptor().lookup_field,
        })?;
        Ok(self.resource_path(id))
    }

    /// Build an entity from a decoded response payload. Unknown keys are
    /// ignored; known fields absent from `data` keep their defaults. The
    /// result is not marked persisted; that is the caller's decision.
    pub fn construct(&self, data: Value) -> Result<E, ApiError> {
        serde_json::from_value(data).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Fetch a single entity by its lookup id.
    pub fn get(&self, id: &str) -> Result<E, ApiError> {
        let response = self.api.call(HttpMethod::Get, &self.resource_path(id), None)?;
        self.entity_from_body(&response.body)
    }

    /// Save `entity`: POST to the collection when it is not yet persisted
    /// (the identity may be server-assigned), PATCH the singular resource
    /// when it is. Returns a new entity built from the server's response;
    /// the argument is left untouched.
    pub fn save(&self, entity: &E) -> Result<E, ApiError> {
        self.write(entity, false)
    }

    /// Full replace: always PUT at the singular resource path.
    pub fn overwrite(&self, entity: &E) -> Result<E, ApiError> {
        self.write(entity, true)
    }

    fn write(&self, entity: &E, overwrite: bool) -> Result<E, ApiError> {
        let payload = Value::Object(entity.normalize()?);
        let response = if overwrite {
            self.api
                .call(HttpMethod::Put, &self.lookup_path(entity)?, Some(&payload))?
        } else if entity.is_persisted() {
            self.api
                .call(HttpMethod::Patch, &self.lookup_path(entity)?, Some(&payload))?
        } else {
            self.api
                .call(HttpMethod::Post, &self.collection_path(), Some(&payload))?
        };
        self.entity_from_body(&response.body)
    }

    /// Delete `entity` at its lookup path. The raw response is returned so
    /// callers can confirm the status (servers answer 204 here).
    pub fn delete(&self, entity: &E) -> Result<HttpResponse, ApiError> {
        self.api.call(HttpMethod::Delete, &self.lookup_path(entity)?, None)
    }

    /// Search the collection, returning the first page wrapped in a
    /// traversable result set.
    ///
    /// Filter keys are entity-kind-specific, except `page` and `paginate_by`
    /// which every collection understands.
    pub fn query<I, K, V>(&self, filters: I) -> Result<PaginatedResultSet<'a, E>, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let raw = self.query_raw(filters)?;
        PaginatedResultSet::from_raw(*self, raw)
    }

    /// Search the collection and return the decoded page payload untouched.
    pub fn query_raw<I, K, V>(&self, filters: I) -> Result<Value, ApiError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(filters)
            .finish();
        let path = format!("{}?{}", self.collection_path(), encoded);
        let response = self.api.call(HttpMethod::Get, &path, None)?;
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Lazily iterate over every entity in the collection.
    pub fn all(&self) -> AllIter<'a, E> {
        AllIter::new(*self, 0, None)
    }

    /// Lazily iterate over the logical index range `[start, stop]` of the
    /// collection (`stop = None` means unbounded). Fails with `InvalidRange`
    /// when `stop < start`.
    pub fn all_range(&self, start: u64, stop: Option<u64>) -> Result<AllIter<'a, E>, ApiError> {
        if let Some(stop) = stop {
            if stop < start {
                return Err(ApiError::InvalidRange { start, stop });
            }
        }
        Ok(AllIter::new(*self, start, stop))
    }

    fn entity_from_body(&self, body: &str) -> Result<E, ApiError> {
        let data: Value = serde_json::from_str(body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        let mut entity = self.construct(data)?;
        entity.set_persisted(true);
        Ok(entity)
    }
}
