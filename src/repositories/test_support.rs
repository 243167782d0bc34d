//! Repository wrapper that records calls and injects failures.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::actor::ActorId;
use crate::error::{AppError, AppResult};
use crate::models::Entity;
use crate::pagination::ListParams;
use crate::repositories::Repository;

type EntityOf<R> = <R as Repository>::Entity;

/// Wraps a repository, counting calls per operation and optionally failing
/// every read or every write with a database error.
pub struct CountingRepository<R: Repository> {
    inner: R,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    pub find_page_calls: AtomicUsize,
    pub find_by_id_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub bulk_update_calls: AtomicUsize,
}

impl<R: Repository> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            find_page_calls: AtomicUsize::new(0),
            find_by_id_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            bulk_update_calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn check(flag: &AtomicBool, operation: &str) -> AppResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!("connection reset by peer"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<R: Repository> Repository for CountingRepository<R> {
    type Entity = EntityOf<R>;

    async fn find_page(
        &self,
        params: &ListParams<<EntityOf<R> as Entity>::Filter>,
    ) -> AppResult<(Vec<EntityOf<R>>, u64)> {
        self.find_page_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_reads, "find page")?;
        self.inner.find_page(params).await
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<EntityOf<R>>> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_reads, "find by id")?;
        self.inner.find_by_id(id).await
    }

    async fn create(&self, new: <EntityOf<R> as Entity>::New) -> AppResult<EntityOf<R>> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_writes, "create")?;
        self.inner.create(new).await
    }

    async fn bulk_create(
        &self,
        new: Vec<<EntityOf<R> as Entity>::New>,
    ) -> AppResult<Vec<EntityOf<R>>> {
        Self::check(&self.fail_writes, "bulk create")?;
        self.inner.bulk_create(new).await
    }

    async fn update(
        &self,
        id: u64,
        patch: <EntityOf<R> as Entity>::Patch,
        actor: ActorId,
    ) -> AppResult<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_writes, "update")?;
        self.inner.update(id, patch, actor).await
    }

    async fn bulk_update(
        &self,
        filter: &<EntityOf<R> as Entity>::Filter,
        patch: <EntityOf<R> as Entity>::Patch,
        actor: ActorId,
    ) -> AppResult<u64> {
        self.bulk_update_calls.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.fail_writes, "bulk update")?;
        self.inner.bulk_update(filter, patch, actor).await
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        Self::check(&self.fail_writes, "delete")?;
        self.inner.delete(id).await
    }

    async fn bulk_delete(&self, filter: &<EntityOf<R> as Entity>::Filter) -> AppResult<u64> {
        Self::check(&self.fail_writes, "bulk delete")?;
        self.inner.bulk_delete(filter).await
    }

    async fn count(&self) -> AppResult<u64> {
        Self::check(&self.fail_reads, "count")?;
        self.inner.count().await
    }
}
