//! User service for business logic operations.
//!
//! Builds on `BaseService` and adds the credential rules: stored passwords
//! are always hashed, an empty credential is never accepted, and profile
//! updates can never touch the password or the id.

use crate::actor::ActorId;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User, UserFilter, UserPatch};
use crate::pagination::{ListParams, PaginatedResult};
use crate::repositories::Repository;
use crate::services::BaseService;
use crate::utils::CredentialHasher;

/// User service for handling user-related business logic.
///
/// Generic over the user repository and the credential hasher, so tests can
/// run against the in-memory repository and a cheap hasher.
#[derive(Clone)]
pub struct UserService<R, H> {
    base: BaseService<R>,
    hasher: H,
}

impl<R, H> UserService<R, H>
where
    R: Repository<Entity = User>,
    H: CredentialHasher,
{
    /// Creates a new UserService with the given repository and hasher.
    pub fn new(repo: R, hasher: H) -> Self {
        Self {
            base: BaseService::new(repo),
            hasher,
        }
    }

    pub fn base(&self) -> &BaseService<R> {
        &self.base
    }

    /// Patch carrying the editable profile fields of `user`.
    ///
    /// Only name, account, status and user type are copied. The password and
    /// the id never appear, whatever `user` holds.
    pub fn profile_patch(user: &User) -> UserPatch {
        UserPatch::profile(user)
    }

    /// Profile patch plus the hash of `new_password`, if one was given.
    ///
    /// An empty `new_password` leaves the stored credential unchanged.
    pub fn credential_patch(&self, user: &User, new_password: &str) -> AppResult<UserPatch> {
        let mut patch = Self::profile_patch(user);
        if !new_password.is_empty() {
            patch.password = Some(self.hash_credential(new_password)?);
        }
        Ok(patch)
    }

    fn hash_credential(&self, plain: &str) -> AppResult<String> {
        self.hasher.hash(plain).map_err(|e| {
            tracing::error!(error = %e, "Failed to hash user credential");
            e
        })
    }

    pub async fn get_all_users(
        &self,
        params: &ListParams<UserFilter>,
    ) -> AppResult<PaginatedResult<User>> {
        self.base.get_all(params).await
    }

    pub async fn get_user_by_id(&self, id: u64) -> AppResult<User> {
        self.base.get_by_id(id).await
    }

    /// Creates a user whose `password` is already hashed.
    ///
    /// # Errors
    /// `EmptyCredential` if `new_user.password` is empty.
    pub async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        if new_user.password.is_empty() {
            return Err(AppError::EmptyCredential);
        }
        self.base.create(new_user).await
    }

    /// Hashes `password` into `new_user` and creates the user.
    ///
    /// # Errors
    /// * `EmptyCredential` - `password` is empty; nothing is stored
    /// * `CredentialHash` - hashing failed
    pub async fn create_user_with_credential(
        &self,
        mut new_user: NewUser,
        password: &str,
    ) -> AppResult<User> {
        if password.is_empty() {
            return Err(AppError::EmptyCredential);
        }
        new_user.password = self.hash_credential(password)?;
        self.create_user(new_user).await
    }

    pub async fn bulk_create_users(&self, new_users: Vec<NewUser>) -> AppResult<Vec<User>> {
        self.base.bulk_create(new_users).await
    }

    /// Copies the profile fields of `user` onto user `id`.
    pub async fn update_user(&self, actor_id: u64, id: u64, user: &User) -> AppResult<()> {
        self.base
            .update(actor_id, id, Self::profile_patch(user))
            .await
    }

    /// Like `update_user`, also replacing the password when `new_password`
    /// is non-empty.
    ///
    /// The actor is checked before anything is hashed.
    pub async fn update_user_with_credential(
        &self,
        actor_id: u64,
        id: u64,
        user: &User,
        new_password: &str,
    ) -> AppResult<()> {
        ActorId::require(actor_id)?;
        let patch = self.credential_patch(user, new_password)?;
        self.base.update(actor_id, id, patch).await
    }

    pub async fn bulk_update_users(
        &self,
        actor_id: u64,
        filter: &UserFilter,
        patch: UserPatch,
    ) -> AppResult<u64> {
        self.base.bulk_update(actor_id, filter, patch).await
    }

    pub async fn delete_user(&self, id: u64) -> AppResult<bool> {
        self.base.delete(id).await
    }

    pub async fn bulk_delete_users(&self, filter: &UserFilter) -> AppResult<u64> {
        self.base.bulk_delete(filter).await
    }

    pub async fn get_user_count(&self) -> AppResult<u64> {
        self.base.get_count().await
    }

    /// Checks `password` against the stored credential of user `id`.
    ///
    /// # Errors
    /// `NotFound` under the same rules as `get_user_by_id`.
    pub async fn verify_credential(&self, id: u64, password: &str) -> AppResult<bool> {
        let user = self.base.get_by_id(id).await?;
        self.hasher.verify(password, &user.password)
    }
}
