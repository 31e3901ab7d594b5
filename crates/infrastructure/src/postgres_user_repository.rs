//! PostgreSQL-backed user repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use chapterdesk_application::{
    NewUserRecord, Page, RegisteredUser, UserFilter, UserProfilePatch, UserRecord, UserRepository,
};
use chapterdesk_core::{AppError, AppResult, NonEmptyString, UserId};
use chapterdesk_domain::{EmailAddress, Membership, UserAccount, UserStatus};

use crate::postgres_rows::{conflict_or_internal, corrupt_column, internal, page_bounds, to_u64};

mod account;
mod lookup;

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    full_name: String,
    password_hash: String,
    status: String,
    membership_number: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            account: UserAccount {
                user_id: UserId::from_uuid(row.id),
                email: EmailAddress::new(row.email).map_err(corrupt_column("users.email"))?,
                full_name: NonEmptyString::new(row.full_name)
                    .map_err(corrupt_column("users.full_name"))?,
                status: UserStatus::from_str(row.status.as_str())
                    .map_err(corrupt_column("users.status"))?,
                membership_number: row.membership_number,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        })
    }
}

const USER_COLUMNS: &str = r#"
    id, email, full_name, password_hash, status, membership_number, created_at, updated_at
"#;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserRecord>> {
        self.find_by_email_impl(email).await
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        self.find_by_id_impl(user_id).await
    }

    async fn next_membership_sequence(&self, year: i32) -> AppResult<u64> {
        self.next_membership_sequence_impl(year).await
    }

    async fn create_user(&self, user: NewUserRecord) -> AppResult<RegisteredUser> {
        self.create_user_impl(user).await
    }

    async fn list_users(&self, filter: &UserFilter) -> AppResult<Page<UserAccount>> {
        self.list_users_impl(filter).await
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        patch: &UserProfilePatch,
    ) -> AppResult<Option<UserAccount>> {
        self.update_profile_impl(user_id, patch).await
    }

    async fn update_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<Option<UserAccount>> {
        self.update_status_impl(user_id, status).await
    }
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    conflict_or_internal(error, operation, || {
        "an account with this email already exists".to_owned()
    })
}
