//! Bulk iteration: a lazy, forward-only walk over a whole collection.
//!
//! # Design
//! `AllIter` drives page-sized fetches through the mapper and yields entities
//! whose logical index falls in the requested `[start, stop]` range. Pages
//! are followed through the server's continuation links, with one shortcut:
//! when `start` lies more than one page ahead, the iterator computes the
//! target page number directly and re-requests with an explicit `page`
//! parameter instead of walking the intervening pages. The sequence is
//! single-pass; a failed page fetch yields the error and ends the iteration.

use std::collections::VecDeque;

use crate::entity::Entity;
use crate::error::ApiError;
use crate::mapper::EntityMapper;
use crate::pagination::{link_params, RawPage};

/// Where the next page comes from.
enum PageSource {
    /// The first page of the collection.
    First,
    /// An explicit page number (deep-skip target).
    Number(u64),
    /// A server-supplied continuation link.
    Link(String),
}

/// Lazy iterator over a logical index range of a collection.
///
/// Yields `Result<E, ApiError>`; the first error ends the sequence.
pub struct AllIter<'a, E: Entity> {
    mapper: EntityMapper<'a, E>,
    start: u64,
    stop: Option<u64>,
    batch_size: u64,
    /// Logical index of the next item the server will hand us.
    count_read: u64,
    /// Total collection size, unknown until the first response.
    total: Option<u64>,
    pending: VecDeque<E>,
    source: Option<PageSource>,
}

impl<E: Entity> std::fmt::Debug for AllIter<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllIter")
            .field("start", &self.start)
            .field("stop", &self.stop)
            .field("batch_size", &self.batch_size)
            .field("count_read", &self.count_read)
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

impl<'a, E: Entity> AllIter<'a, E> {
    pub(crate) fn new(mapper: EntityMapper<'a, E>, start: u64, stop: Option<u64>) -> Self {
        Self {
            mapper,
            start,
            stop,
            batch_size: mapper.api().batch_size(),
            count_read: 0,
            total: None,
            pending: VecDeque::new(),
            source: Some(PageSource::First),
        }
    }

    fn in_range(&self, index: u64) -> bool {
        index >= self.start && self.stop.is_none_or(|stop| index <= stop)
    }

    /// Fetch one page from `source`, queue its in-range items, and decide
    /// where to go next. Leaves `self.source` as `None` when the walk ends.
    fn fetch(&mut self, source: PageSource) -> Result<(), ApiError> {
        let batch = self.batch_size.to_string();
        let raw = match source {
            PageSource::First => self.mapper.query_raw([("paginate_by", batch.as_str())])?,
            PageSource::Number(page) => self.mapper.query_raw([
                ("paginate_by", batch.as_str()),
                ("page", page.to_string().as_str()),
            ])?,
            PageSource::Link(link) => self.mapper.query_raw(link_params(&link)?)?,
        };
        let page = RawPage::from_value(raw)?;

        if self.total.is_none() {
            self.total = Some(page.count);
            if self.start > page.count {
                return Ok(());
            }
            // Deep skip: jump straight to the page holding `start` instead
            // of walking every page up to it.
            if self.batch_size < self.start && self.start > self.count_read + self.batch_size {
                let target = self.start / self.batch_size + 1;
                self.count_read = (target - 1) * self.batch_size;
                self.source = Some(PageSource::Number(target));
                return Ok(());
            }
        }

        for result in page.results {
            let index = self.count_read;
            self.count_read += 1;
            if self.in_range(index) {
                let mut entity = self.mapper.construct(result)?;
                entity.set_persisted(true);
                self.pending.push_back(entity);
            }
        }

        if self.stop.is_some_and(|stop| self.count_read > stop) {
            return Ok(());
        }
        self.source = page.next.map(PageSource::Link);
        Ok(())
    }
}

impl<E: Entity> Iterator for AllIter<'_, E> {
    type Item = Result<E, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entity) = self.pending.pop_front() {
                return Some(Ok(entity));
            }
            let source = self.source.take()?;
            if let Err(err) = self.fetch(source) {
                return Some(Err(err));
            }
        }
    }
}
