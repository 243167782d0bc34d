use diesel::deserialize::{self, FromSql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use diesel::{AsExpression, FromSqlRow};
use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::actor::ActorId;
use crate::models::{Entity, Record};

// ============================================================================
// Enums
// ============================================================================

/// Account status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl ToSql<Text, Pg> for UserStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for UserStatus {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Unrecognized user status: {}", s).into()),
        }
    }
}

/// Account type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    #[default]
    Member,
    Guest,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Admin => "admin",
            UserType::Member => "member",
            UserType::Guest => "guest",
        }
    }
}

impl ToSql<Text, Pg> for UserType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Pg> for UserType {
    fn from_sql(bytes: <Pg as diesel::backend::Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Pg>>::from_sql(bytes)?;
        match s.as_str() {
            "admin" => Ok(UserType::Admin),
            "member" => Ok(UserType::Member),
            "guest" => Ok(UserType::Guest),
            _ => Err(format!("Unrecognized user type: {}", s).into()),
        }
    }
}

// ============================================================================
// Domain types
// ============================================================================

/// A user account. `password` always holds the hashed credential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub account: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub status: UserStatus,
    pub user_type: UserType,
    pub updated_by: Option<u64>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Payload for creating a user
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub account: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default)]
    pub user_type: UserType,
}

/// Partial update of a user; `None` fields stay untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub account: Option<String>,
    pub password: Option<String>,
    pub status: Option<UserStatus>,
    pub user_type: Option<UserType>,
}

impl UserPatch {
    /// Patch carrying the profile fields of `user` that callers may change:
    /// name, account, status and type. Never the credential or the id.
    pub fn profile(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            account: Some(user.account.clone()),
            password: None,
            status: Some(user.status),
            user_type: Some(user.user_type),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.account.is_none()
            && self.password.is_none()
            && self.status.is_none()
            && self.user_type.is_none()
    }
}

/// Predicate over users; every field that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserFilter {
    pub ids: Option<Vec<u64>>,
    pub account: Option<String>,
    /// Case-insensitive substring of the display name
    pub name_contains: Option<String>,
    pub status: Option<UserStatus>,
    pub user_type: Option<UserType>,
}

impl UserFilter {
    pub fn by_status(status: UserStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn by_type(user_type: UserType) -> Self {
        Self {
            user_type: Some(user_type),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_none()
            && self.account.is_none()
            && self.name_contains.is_none()
            && self.status.is_none()
            && self.user_type.is_none()
    }
}

impl Entity for User {
    const NAME: &'static str = "user";

    type New = NewUser;
    type Patch = UserPatch;
    type Filter = UserFilter;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for User {
    fn materialize(id: u64, new: NewUser) -> Self {
        let now = now_utc();
        Self {
            id,
            name: new.name,
            account: new.account,
            password: new.password,
            status: new.status,
            user_type: new.user_type,
            updated_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &UserPatch, actor: ActorId) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(account) = &patch.account {
            self.account = account.clone();
        }
        if let Some(password) = &patch.password {
            self.password = password.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(user_type) = patch.user_type {
            self.user_type = user_type;
        }
        self.updated_by = Some(actor.get());
        self.updated_at = now_utc();
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        filter.ids.as_ref().is_none_or(|ids| ids.contains(&self.id))
            && filter.account.as_ref().is_none_or(|a| *a == self.account)
            && filter.name_contains.as_ref().is_none_or(|needle| {
                self.name.to_lowercase().contains(&needle.to_lowercase())
            })
            && filter.status.is_none_or(|s| s == self.status)
            && filter.user_type.is_none_or(|t| t == self.user_type)
    }

    fn filter_is_empty(filter: &UserFilter) -> bool {
        filter.is_empty()
    }

    fn sort_key(&self, column: &str) -> String {
        match column {
            "name" => self.name.to_lowercase(),
            "account" => self.account.clone(),
            "created_at" => self.created_at.to_string(),
            _ => format!("{:020}", self.id),
        }
    }
}

fn now_utc() -> DateTime {
    jiff::Timestamp::now()
        .to_zoned(jiff::tz::TimeZone::UTC)
        .datetime()
}

// ============================================================================
// Database rows
// ============================================================================

/// Row read from the `users` table
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub account: String,
    pub password: String,
    pub status: UserStatus,
    pub user_type: UserType,
    pub updated_by: Option<i64>,
    pub created_at: jiff_diesel::DateTime,
    pub updated_at: jiff_diesel::DateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id as u64,
            name: row.name,
            account: row.account,
            password: row.password,
            status: row.status,
            user_type: row.user_type,
            updated_by: row.updated_by.map(|id| id as u64),
            created_at: row.created_at.to_jiff(),
            updated_at: row.updated_at.to_jiff(),
        }
    }
}

/// Row inserted into the `users` table
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUserRow {
    pub name: String,
    pub account: String,
    pub password: String,
    pub status: UserStatus,
    pub user_type: UserType,
}

impl From<NewUser> for NewUserRow {
    fn from(new: NewUser) -> Self {
        Self {
            name: new.name,
            account: new.account,
            password: new.password,
            status: new.status,
            user_type: new.user_type,
        }
    }
}

/// Changeset for `UPDATE users`; `None` columns are left out of the SET list.
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChangeset {
    pub name: Option<String>,
    pub account: Option<String>,
    pub password: Option<String>,
    pub status: Option<UserStatus>,
    pub user_type: Option<UserType>,
    pub updated_by: i64,
}

impl UserChangeset {
    pub fn new(patch: &UserPatch, actor: ActorId) -> Self {
        Self {
            name: patch.name.clone(),
            account: patch.account.clone(),
            password: patch.password.clone(),
            status: patch.status,
            user_type: patch.user_type,
            updated_by: actor.get() as i64,
        }
    }
}
