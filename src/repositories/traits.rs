//! Persistence contract the services are generic over.

use async_trait::async_trait;

use crate::actor::ActorId;
use crate::error::AppResult;
use crate::models::Entity;
use crate::pagination::ListParams;

/// Per-entity persistence operations.
///
/// Implementations do the storage I/O and enforce no business rules beyond
/// their own integrity: bulk update and bulk delete refuse an empty filter,
/// and `update` reports `NotFound` when no row was touched.
#[async_trait]
pub trait Repository: Send + Sync {
    type Entity: Entity;

    /// One page of records matching `params.filter`, plus the total number
    /// of matching records.
    async fn find_page(
        &self,
        params: &ListParams<<Self::Entity as Entity>::Filter>,
    ) -> AppResult<(Vec<Self::Entity>, u64)>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<Self::Entity>>;

    /// Inserts a record; the returned entity carries the assigned id.
    async fn create(&self, new: <Self::Entity as Entity>::New) -> AppResult<Self::Entity>;

    async fn bulk_create(
        &self,
        new: Vec<<Self::Entity as Entity>::New>,
    ) -> AppResult<Vec<Self::Entity>>;

    async fn update(
        &self,
        id: u64,
        patch: <Self::Entity as Entity>::Patch,
        actor: ActorId,
    ) -> AppResult<()>;

    /// Applies `patch` to every record matching `filter`; returns the number
    /// of records changed.
    async fn bulk_update(
        &self,
        filter: &<Self::Entity as Entity>::Filter,
        patch: <Self::Entity as Entity>::Patch,
        actor: ActorId,
    ) -> AppResult<u64>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: u64) -> AppResult<bool>;

    async fn bulk_delete(&self, filter: &<Self::Entity as Entity>::Filter) -> AppResult<u64>;

    async fn count(&self) -> AppResult<u64>;
}
