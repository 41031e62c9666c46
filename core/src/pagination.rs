//! Paginated result sets and continuation-link handling.
//!
//! # Design
//! A query answer is one page of a cursor-based result set:
//! `{count, next, previous, results}`. `PaginatedResultSet` materializes the
//! page's entities and lets the caller walk forward and backward by following
//! the server-supplied continuation links. The links are opaque: the set
//! never builds one itself, it only extracts the query-string parameters of a
//! link the server handed out and re-issues the query with them. A traversal
//! either fully replaces the set's contents or, on failure, leaves it exactly
//! as it was.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::entity::Entity;
use crate::error::ApiError;
use crate::mapper::EntityMapper;

/// Decoded pagination envelope, as served by every collection endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Value>,
}

impl RawPage {
    pub fn from_value(raw: Value) -> Result<Self, ApiError> {
        serde_json::from_value(raw).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Extract the query-string portion of a continuation link as flat pairs.
pub(crate) fn link_params(link: &str) -> Result<Vec<(String, String)>, ApiError> {
    let url = Url::parse(link)
        .map_err(|e| ApiError::DeserializationError(format!("bad continuation link: {e}")))?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// One page of query results, traversable in both directions.
pub struct PaginatedResultSet<'a, E: Entity> {
    mapper: EntityMapper<'a, E>,
    entities: Vec<E>,
    count: u64,
    next_link: Option<String>,
    previous_link: Option<String>,
}

impl<'a, E: Entity> PaginatedResultSet<'a, E> {
    /// Wrap a raw page payload. Every result is constructed and marked
    /// persisted, since it came straight from the server.
    pub(crate) fn from_raw(mapper: EntityMapper<'a, E>, raw: Value) -> Result<Self, ApiError> {
        let page = RawPage::from_value(raw)?;
        let (entities, count, next_link, previous_link) = Self::materialize(mapper, page)?;
        Ok(Self {
            mapper,
            entities,
            count,
            next_link,
            previous_link,
        })
    }

    fn materialize(
        mapper: EntityMapper<'a, E>,
        page: RawPage,
    ) -> Result<(Vec<E>, u64, Option<String>, Option<String>), ApiError> {
        let mut entities = Vec::with_capacity(page.results.len());
        for result in page.results {
            let mut entity = mapper.construct(result)?;
            entity.set_persisted(true);
            entities.push(entity);
        }
        Ok((entities, page.count, page.next, page.previous))
    }

    /// The current page's entities, in server order.
    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    /// Total number of entities matching the query, across all pages.
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn has_next(&self) -> bool {
        self.next_link.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous_link.is_some()
    }

    /// Replace this set with the next page and return its entities.
    /// Fails with `Exhausted` when there is no next link.
    pub fn next(&mut self) -> Result<&[E], ApiError> {
        let link = self.next_link.clone().ok_or(ApiError::Exhausted)?;
        self.follow(&link)
    }

    /// Replace this set with the previous page and return its entities.
    /// Fails with `Exhausted` when there is no previous link.
    pub fn previous(&mut self) -> Result<&[E], ApiError> {
        let link = self.previous_link.clone().ok_or(ApiError::Exhausted)?;
        self.follow(&link)
    }

    fn follow(&mut self, link: &str) -> Result<&[E], ApiError> {
        let params = link_params(link)?;
        let raw = self.mapper.query_raw(params)?;
        let page = RawPage::from_value(raw)?;
        let (entities, count, next_link, previous_link) = Self::materialize(self.mapper, page)?;

        // Everything decoded cleanly; only now touch our own state.
        self.entities = entities;
        self.count = count;
        self.next_link = next_link;
        self.previous_link = previous_link;
        Ok(&self.entities)
    }
}
