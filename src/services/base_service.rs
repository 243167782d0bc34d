//! Generic CRUD service over any `Repository`.
//!
//! Only updates are attributed: `update` and `bulk_update` require a
//! non-zero actor id, while creates and deletes do not. Read failures are
//! logged and collapsed to `NotFound` or `RepositoryRead`; write failures
//! keep the repository's typed error.

use crate::actor::ActorId;
use crate::error::{AppError, AppResult};
use crate::models::Entity;
use crate::pagination::{ListParams, PaginatedResult};
use crate::repositories::Repository;

type EntityOf<R> = <R as Repository>::Entity;
type NewOf<R> = <EntityOf<R> as Entity>::New;
type PatchOf<R> = <EntityOf<R> as Entity>::Patch;
type FilterOf<R> = <EntityOf<R> as Entity>::Filter;

/// CRUD operations shared by every entity type.
///
/// Holds no per-entity state; every call is forwarded to the repository.
#[derive(Clone)]
pub struct BaseService<R> {
    repo: R,
}

impl<R: Repository> BaseService<R> {
    const ENTITY: &'static str = <EntityOf<R> as Entity>::NAME;

    /// Creates a new BaseService with the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists one page of entities matching `params.filter`.
    ///
    /// # Errors
    /// `RepositoryRead` if the repository fails; the cause is only logged.
    pub async fn get_all(
        &self,
        params: &ListParams<FilterOf<R>>,
    ) -> AppResult<PaginatedResult<EntityOf<R>>> {
        let (data, total) = self.repo.find_page(params).await.map_err(|e| {
            tracing::error!(
                entity = Self::ENTITY,
                page = params.page,
                per_page = params.per_page,
                error = %e,
                "Failed to fetch page"
            );
            AppError::RepositoryRead {
                entity: Self::ENTITY.to_string(),
            }
        })?;

        Ok(PaginatedResult::new(data, params, total))
    }

    /// Gets an entity by id.
    ///
    /// # Errors
    /// `NotFound` both when the entity is absent and when the lookup fails.
    pub async fn get_by_id(&self, id: u64) -> AppResult<EntityOf<R>> {
        match self.repo.find_by_id(id).await {
            Ok(Some(entity)) => Ok(entity),
            Ok(None) => {
                tracing::warn!(entity = Self::ENTITY, id, "Entity not found");
                Err(AppError::not_found(Self::ENTITY, id))
            }
            Err(e) => {
                tracing::warn!(
                    entity = Self::ENTITY,
                    id,
                    error = %e,
                    "Failed to fetch entity"
                );
                Err(AppError::not_found(Self::ENTITY, id))
            }
        }
    }

    pub async fn create(&self, new: NewOf<R>) -> AppResult<EntityOf<R>> {
        self.repo.create(new).await
    }

    pub async fn bulk_create(&self, new: Vec<NewOf<R>>) -> AppResult<Vec<EntityOf<R>>> {
        self.repo.bulk_create(new).await
    }

    /// Applies `patch` to entity `id` on behalf of `actor_id`.
    ///
    /// The actor is validated first, then the entity must exist; the
    /// repository's update is only reached when both hold.
    ///
    /// # Errors
    /// * `InvalidActor` - `actor_id` is zero
    /// * `NotFound` - the entity does not exist or could not be read
    /// * any error the repository's update reports
    pub async fn update(&self, actor_id: u64, id: u64, patch: PatchOf<R>) -> AppResult<()> {
        let actor = ActorId::require(actor_id)?;
        self.get_by_id(id).await?;

        self.repo.update(id, patch, actor).await?;
        tracing::debug!(entity = Self::ENTITY, id, actor = %actor, "Entity updated");
        Ok(())
    }

    /// Applies `patch` to every entity matching `filter`.
    ///
    /// Returns the number of entities changed.
    pub async fn bulk_update(
        &self,
        actor_id: u64,
        filter: &FilterOf<R>,
        patch: PatchOf<R>,
    ) -> AppResult<u64> {
        let actor = ActorId::require(actor_id)?;

        let changed = self.repo.bulk_update(filter, patch, actor).await?;
        tracing::debug!(entity = Self::ENTITY, changed, actor = %actor, "Entities updated");
        Ok(changed)
    }

    /// Deletes entity `id`; `false` if it did not exist.
    pub async fn delete(&self, id: u64) -> AppResult<bool> {
        self.repo.delete(id).await
    }

    pub async fn bulk_delete(&self, filter: &FilterOf<R>) -> AppResult<u64> {
        self.repo.bulk_delete(filter).await
    }

    pub async fn get_count(&self) -> AppResult<u64> {
        self.repo.count().await
    }
}
