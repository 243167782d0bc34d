//! In-memory repository backed by a concurrent map.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::actor::ActorId;
use crate::error::{AppError, AppResult};
use crate::models::Record;
use crate::pagination::{ListParams, SortOrder};
use crate::repositories::Repository;

/// Stores records of any `Record` type in a `DashMap`, assigning ids from a
/// monotonically increasing sequence starting at 1.
pub struct InMemoryRepository<E: Record> {
    records: DashMap<u64, E>,
    next_id: AtomicU64,
}

impl<E: Record> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn insert(&self, new: E::New) -> E {
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        let record = E::materialize(id, new);
        self.records.insert(id, record.clone());
        record
    }

    fn reject_empty_filter(filter: &E::Filter, operation: &str) -> AppResult<()> {
        if E::filter_is_empty(filter) {
            return Err(AppError::validation(
                "filter",
                format!("{} on {} requires at least one condition", operation, E::NAME),
            ));
        }
        Ok(())
    }

    fn compare(a: &E, b: &E, sort_by: Option<&str>) -> Ordering {
        match sort_by {
            Some(column) => a
                .sort_key(column)
                .cmp(&b.sort_key(column))
                .then_with(|| a.id().cmp(&b.id())),
            None => a.id().cmp(&b.id()),
        }
    }
}

impl<E: Record> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Record> Repository for InMemoryRepository<E> {
    type Entity = E;

    async fn find_page(&self, params: &ListParams<E::Filter>) -> AppResult<(Vec<E>, u64)> {
        let mut matching: Vec<E> = self
            .records
            .iter()
            .filter(|entry| entry.value().matches(&params.filter))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| Self::compare(a, b, params.sort_by.as_deref()));
        if params.sort_order == SortOrder::Desc {
            matching.reverse();
        }

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<E>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, new: E::New) -> AppResult<E> {
        Ok(self.insert(new))
    }

    async fn bulk_create(&self, new: Vec<E::New>) -> AppResult<Vec<E>> {
        Ok(new.into_iter().map(|n| self.insert(n)).collect())
    }

    async fn update(&self, id: u64, patch: E::Patch, actor: ActorId) -> AppResult<()> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(E::NAME, id))?;
        entry.value_mut().apply(&patch, actor);
        Ok(())
    }

    async fn bulk_update(
        &self,
        filter: &E::Filter,
        patch: E::Patch,
        actor: ActorId,
    ) -> AppResult<u64> {
        Self::reject_empty_filter(filter, "bulk update")?;

        let mut changed = 0;
        for mut entry in self.records.iter_mut() {
            if entry.value().matches(filter) {
                entry.value_mut().apply(&patch, actor);
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        Ok(self.records.remove(&id).is_some())
    }

    async fn bulk_delete(&self, filter: &E::Filter) -> AppResult<u64> {
        Self::reject_empty_filter(filter, "bulk delete")?;

        let ids: Vec<u64> = self
            .records
            .iter()
            .filter(|entry| entry.value().matches(filter))
            .map(|entry| *entry.key())
            .collect();

        Ok(ids
            .into_iter()
            .filter(|id| self.records.remove(id).is_some())
            .count() as u64)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.records.len() as u64)
    }
}
