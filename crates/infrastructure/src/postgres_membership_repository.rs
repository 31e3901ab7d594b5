use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use chapterdesk_application::{BranchMember, MemberFilter, MembershipRepository, Page};
use chapterdesk_core::{AppError, AppResult, UserId};
use chapterdesk_domain::{BranchId, Membership, MembershipId, MembershipStatus};

use crate::postgres_rows::{conflict_or_internal, corrupt_column, internal, page_bounds, to_u64};


/// PostgreSQL-backed branch membership repository.
#[derive(Clone)]
pub struct PostgresMembershipRepository {
    pool: PgPool,
}

impl PostgresMembershipRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    branch_id: uuid::Uuid,
    status: String,
    approved_by: Option<uuid::Uuid>,
    approved_at: Option<DateTime<Utc>>,
    card_issued: bool,
    card_issued_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = AppError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            membership_id: MembershipId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            branch_id: BranchId::from_uuid(row.branch_id),
            status: MembershipStatus::from_str(row.status.as_str())
                .map_err(corrupt_column("memberships.status"))?,
            approved_by: row.approved_by.map(UserId::from_uuid),
            approved_at: row.approved_at,
            card_issued: row.card_issued,
            card_issued_at: row.card_issued_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct MemberRow {
    #[sqlx(flatten)]
    membership: MembershipRow,
    full_name: String,
    email: String,
    membership_number: String,
}

#[async_trait]
impl MembershipRepository for PostgresMembershipRepository {
    async fn list_branch_members(
        &self,
        branch_id: BranchId,
        filter: &MemberFilter,
    ) -> AppResult<Page<BranchMember>> {
        let (limit, offset) = page_bounds(&filter.page)?;
        let status = filter.status.map(|status| status.as_str());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM memberships
            INNER JOIN users ON users.id = memberships.user_id
            WHERE memberships.branch_id = $1
              AND ($2::TEXT IS NULL OR memberships.status = $2)
            "#,
        )
        .bind(branch_id.as_uuid())
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(internal("count branch members"))?;

        let rows = sqlx::query_as::<_, MemberRow>(
            r#"
            SELECT
                memberships.id,
                memberships.user_id,
                memberships.branch_id,
                memberships.status,
                memberships.approved_by,
                memberships.approved_at,
                memberships.card_issued,
                memberships.card_issued_at,
                memberships.created_at,
                memberships.updated_at,
                users.full_name,
                users.email,
                users.membership_number
            FROM memberships
            INNER JOIN users ON users.id = memberships.user_id
            WHERE memberships.branch_id = $1
              AND ($2::TEXT IS NULL OR memberships.status = $2)
            ORDER BY users.full_name, memberships.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(branch_id.as_uuid())
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list branch members"))?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok(BranchMember {
                    membership: Membership::try_from(row.membership)?,
                    full_name: row.full_name,
                    email: row.email,
                    membership_number: row.membership_number,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Page {
            items,
            total: to_u64("count", total)?,
        })
    }

    async fn find_membership_by_id(
        &self,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                id, user_id, branch_id, status, approved_by, approved_at,
                card_issued, card_issued_at, created_at, updated_at
            FROM memberships
            WHERE id = $1
            "#,
        )
        .bind(membership_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find membership by id"))?
        .map(Membership::try_from)
        .transpose()
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                id, user_id, branch_id, status, approved_by, approved_at,
                card_issued, card_issued_at, created_at, updated_at
            FROM memberships
            WHERE user_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list user memberships"))?;

        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn find_membership(
        &self,
        user_id: UserId,
        branch_id: BranchId,
    ) -> AppResult<Option<Membership>> {
        sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT
                id, user_id, branch_id, status, approved_by, approved_at,
                card_issued, card_issued_at, created_at, updated_at
            FROM memberships
            WHERE user_id = $1 AND branch_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(branch_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find membership"))?
        .map(Membership::try_from)
        .transpose()
    }

    async fn create_membership(&self, membership: Membership) -> AppResult<Membership> {
        sqlx::query(
            r#"
            INSERT INTO memberships (
                id, user_id, branch_id, status, approved_by, approved_at,
                card_issued, card_issued_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(membership.membership_id.as_uuid())
        .bind(membership.user_id.as_uuid())
        .bind(membership.branch_id.as_uuid())
        .bind(membership.status.as_str())
        .bind(membership.approved_by.map(|id| id.as_uuid()))
        .bind(membership.approved_at)
        .bind(membership.card_issued)
        .bind(membership.card_issued_at)
        .bind(membership.created_at)
        .bind(membership.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "create membership", || {
                format!(
                    "user '{}' already has a membership of branch '{}'",
                    membership.user_id, membership.branch_id
                )
            })
        })?;

        Ok(membership)
    }

    async fn save_membership(&self, membership: Membership) -> AppResult<Membership> {
        let result = sqlx::query(
            r#"
            UPDATE memberships
            SET status = $2,
                approved_by = $3,
                approved_at = $4,
                card_issued = $5,
                card_issued_at = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(membership.membership_id.as_uuid())
        .bind(membership.status.as_str())
        .bind(membership.approved_by.map(|id| id.as_uuid()))
        .bind(membership.approved_at)
        .bind(membership.card_issued)
        .bind(membership.card_issued_at)
        .bind(membership.updated_at)
        .execute(&self.pool)
        .await
        .map_err(internal("save membership"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "membership '{}' was not found",
                membership.membership_id
            )));
        }

        Ok(membership)
    }

    async fn count_active_members(&self, branch_id: BranchId) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM memberships
            WHERE branch_id = $1 AND status = 'active'
            "#,
        )
        .bind(branch_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(internal("count active members"))?;

        to_u64("count", count)
    }
}
