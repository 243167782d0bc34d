//! PostgreSQL user repository for async database operations.
//!
//! Provides the `Repository` operations for the users table using diesel_async.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::RunQueryDsl;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;

use crate::actor::ActorId;
use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{
    Entity, NewUser, NewUserRow, User, UserChangeset, UserFilter, UserPatch, UserRow,
};
use crate::pagination::{ListParams, SortOrder};
use crate::repositories::Repository;
use crate::schema::users;

type UserPredicate = Box<dyn BoxableExpression<users::table, Pg, SqlType = Bool>>;
type PooledConnection<'a> =
    bb8::PooledConnection<'a, AsyncDieselConnectionManager<diesel_async::AsyncPgConnection>>;

/// User repository holding an async connection pool.
///
/// Since `AsyncDbPool` (bb8::Pool) internally uses `Arc`, cloning is cheap
/// (just reference count increment). No need for `Arc<PgUserRepository>`.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: AsyncDbPool,
}

impl PgUserRepository {
    /// Creates a new PgUserRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> AppResult<PooledConnection<'_>> {
        self.pool.get().await.map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::from(e),
        })
    }

    /// Finds a user by account handle.
    pub async fn find_by_account(&self, handle: &str) -> AppResult<Option<User>> {
        let mut conn = self.conn().await?;

        users::table
            .filter(users::account.eq(handle))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "find user by account"))
    }
}

/// Database ids are BIGINT; anything above `i64::MAX` cannot exist.
fn db_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

/// `%needle%`, with LIKE metacharacters in `needle` matched literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Builds the WHERE clause for `filter`, or `None` when it has no conditions.
fn predicate(filter: &UserFilter) -> Option<UserPredicate> {
    let mut clauses: Vec<UserPredicate> = Vec::new();

    if let Some(ids) = &filter.ids {
        let ids: Vec<i64> = ids.iter().filter_map(|id| db_id(*id)).collect();
        clauses.push(Box::new(users::id.eq_any(ids)));
    }
    if let Some(account) = &filter.account {
        clauses.push(Box::new(users::account.eq(account.clone())));
    }
    if let Some(needle) = &filter.name_contains {
        clauses.push(Box::new(users::name.ilike(contains_pattern(needle))));
    }
    if let Some(status) = filter.status {
        clauses.push(Box::new(users::status.eq(status)));
    }
    if let Some(user_type) = filter.user_type {
        clauses.push(Box::new(users::user_type.eq(user_type)));
    }

    clauses
        .into_iter()
        .reduce(|acc, clause| Box::new(acc.and(clause)))
}

fn require_predicate(filter: &UserFilter, operation: &str) -> AppResult<UserPredicate> {
    predicate(filter).ok_or_else(|| {
        AppError::validation(
            "filter",
            format!("{} on {} requires at least one condition", operation, User::NAME),
        )
    })
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[async_trait]
impl Repository for PgUserRepository {
    type Entity = User;

    async fn find_page(&self, params: &ListParams<UserFilter>) -> AppResult<(Vec<User>, u64)> {
        let mut conn = self.conn().await?;

        let mut count_query = users::table.select(count_star()).into_boxed();
        if let Some(pred) = predicate(&params.filter) {
            count_query = count_query.filter(pred);
        }
        let total: i64 = count_query
            .get_result(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "count users"))?;

        let mut query = users::table.select(UserRow::as_select()).into_boxed();
        if let Some(pred) = predicate(&params.filter) {
            query = query.filter(pred);
        }
        let desc = params.sort_order == SortOrder::Desc;
        query = match (params.sort_by.as_deref(), desc) {
            (Some("name"), false) => query.order((users::name.asc(), users::id.asc())),
            (Some("name"), true) => query.order((users::name.desc(), users::id.desc())),
            (Some("account"), false) => query.order(users::account.asc()),
            (Some("account"), true) => query.order(users::account.desc()),
            (Some("created_at"), false) => query.order((users::created_at.asc(), users::id.asc())),
            (Some("created_at"), true) => {
                query.order((users::created_at.desc(), users::id.desc()))
            }
            (_, false) => query.order(users::id.asc()),
            (_, true) => query.order(users::id.desc()),
        };

        let rows: Vec<UserRow> = query
            .offset(params.offset() as i64)
            .limit(params.limit() as i64)
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list users"))?;

        Ok((rows.into_iter().map(User::from).collect(), to_count(total)))
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<User>> {
        let Some(user_id) = db_id(id) else {
            return Ok(None);
        };
        let mut conn = self.conn().await?;

        users::table
            .filter(users::id.eq(user_id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "find user"))
    }

    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut conn = self.conn().await?;

        diesel::insert_into(users::table)
            .values(NewUserRow::from(new))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert user"))
    }

    async fn bulk_create(&self, new: Vec<NewUser>) -> AppResult<Vec<User>> {
        if new.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<NewUserRow> = new.into_iter().map(NewUserRow::from).collect();
        let mut conn = self.conn().await?;

        diesel::insert_into(users::table)
            .values(&rows)
            .returning(UserRow::as_returning())
            .get_results(&mut conn)
            .await
            .map(|rows: Vec<UserRow>| rows.into_iter().map(User::from).collect())
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "bulk insert users"))
    }

    async fn update(&self, id: u64, patch: UserPatch, actor: ActorId) -> AppResult<()> {
        let user_id = db_id(id).ok_or_else(|| AppError::not_found(User::NAME, id))?;
        let mut conn = self.conn().await?;

        let affected = diesel::update(users::table.filter(users::id.eq(user_id)))
            .set((
                UserChangeset::new(&patch, actor),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "update user"))?;

        if affected == 0 {
            return Err(AppError::not_found(User::NAME, id));
        }
        Ok(())
    }

    async fn bulk_update(
        &self,
        filter: &UserFilter,
        patch: UserPatch,
        actor: ActorId,
    ) -> AppResult<u64> {
        let pred = require_predicate(filter, "bulk update")?;
        let mut conn = self.conn().await?;

        let affected = diesel::update(users::table.filter(pred))
            .set((
                UserChangeset::new(&patch, actor),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "bulk update users"))?;

        Ok(affected as u64)
    }

    async fn delete(&self, id: u64) -> AppResult<bool> {
        let Some(user_id) = db_id(id) else {
            return Ok(false);
        };
        let mut conn = self.conn().await?;

        let affected = diesel::delete(users::table.filter(users::id.eq(user_id)))
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "delete user"))?;

        Ok(affected > 0)
    }

    async fn bulk_delete(&self, filter: &UserFilter) -> AppResult<u64> {
        let pred = require_predicate(filter, "bulk delete")?;
        let mut conn = self.conn().await?;

        let affected = diesel::delete(users::table.filter(pred))
            .execute(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "bulk delete users"))?;

        Ok(affected as u64)
    }

    async fn count(&self) -> AppResult<u64> {
        let mut conn = self.conn().await?;

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "count users"))?;

        Ok(to_count(total))
    }
}
