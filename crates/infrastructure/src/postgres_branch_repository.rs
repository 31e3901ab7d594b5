use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use chapterdesk_application::{BranchFilter, BranchRepository};
use chapterdesk_core::{AppError, AppResult, NonEmptyString, UserId};
use chapterdesk_domain::{BranchDefinition, BranchId, BranchStatus, ChapterId};

use crate::postgres_rows::{conflict_or_internal, corrupt_column, internal, to_i32, to_u32};

/// PostgreSQL-backed branch repository.
#[derive(Clone)]
pub struct PostgresBranchRepository {
    pool: PgPool,
}

impl PostgresBranchRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BranchRow {
    id: uuid::Uuid,
    chapter_id: uuid::Uuid,
    name: String,
    location: String,
    description: Option<String>,
    min_members: i32,
    status: String,
    created_by: Option<uuid::Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BranchRow> for BranchDefinition {
    type Error = AppError;

    fn try_from(row: BranchRow) -> Result<Self, Self::Error> {
        Ok(Self {
            branch_id: BranchId::from_uuid(row.id),
            chapter_id: ChapterId::from_uuid(row.chapter_id),
            name: NonEmptyString::new(row.name).map_err(corrupt_column("branches.name"))?,
            location: NonEmptyString::new(row.location)
                .map_err(corrupt_column("branches.location"))?,
            description: row.description,
            min_members: to_u32("branches.min_members", row.min_members)?,
            status: BranchStatus::from_str(row.status.as_str())
                .map_err(corrupt_column("branches.status"))?,
            created_by: row.created_by.map(UserId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl BranchRepository for PostgresBranchRepository {
    async fn list_branches(&self, filter: &BranchFilter) -> AppResult<Vec<BranchDefinition>> {
        let branch_ids: Option<Vec<uuid::Uuid>> = filter
            .branch_ids
            .as_ref()
            .map(|ids| ids.iter().map(BranchId::as_uuid).collect());

        let rows = sqlx::query_as::<_, BranchRow>(
            r#"
            SELECT
                id, chapter_id, name, location, description, min_members,
                status, created_by, created_at, updated_at
            FROM branches
            WHERE ($1::UUID IS NULL OR chapter_id = $1)
                AND ($2::TEXT IS NULL OR status = $2)
                AND ($3::UUID[] IS NULL OR id = ANY($3))
            ORDER BY name
            "#,
        )
        .bind(filter.chapter_id.map(|id| id.as_uuid()))
        .bind(filter.status.map(|status| status.as_str()))
        .bind(branch_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list branches"))?;

        rows.into_iter().map(BranchDefinition::try_from).collect()
    }

    async fn find_branch(&self, branch_id: BranchId) -> AppResult<Option<BranchDefinition>> {
        sqlx::query_as::<_, BranchRow>(
            r#"
            SELECT
                id, chapter_id, name, location, description, min_members,
                status, created_by, created_at, updated_at
            FROM branches
            WHERE id = $1
            "#,
        )
        .bind(branch_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find branch"))?
        .map(BranchDefinition::try_from)
        .transpose()
    }

    async fn create_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition> {
        sqlx::query(
            r#"
            INSERT INTO branches (
                id, chapter_id, name, location, description, min_members,
                status, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(branch.branch_id.as_uuid())
        .bind(branch.chapter_id.as_uuid())
        .bind(branch.name.as_str())
        .bind(branch.location.as_str())
        .bind(branch.description.as_deref())
        .bind(to_i32("min_members", branch.min_members)?)
        .bind(branch.status.as_str())
        .bind(branch.created_by.map(|id| id.as_uuid()))
        .bind(branch.created_at)
        .bind(branch.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "create branch", || {
                format!("branch '{}' already exists in this chapter", branch.name)
            })
        })?;

        Ok(branch)
    }

    async fn save_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition> {
        let result = sqlx::query(
            r#"
            UPDATE branches
            SET name = $2,
                location = $3,
                description = $4,
                min_members = $5,
                status = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(branch.branch_id.as_uuid())
        .bind(branch.name.as_str())
        .bind(branch.location.as_str())
        .bind(branch.description.as_deref())
        .bind(to_i32("min_members", branch.min_members)?)
        .bind(branch.status.as_str())
        .bind(branch.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "save branch", || {
                format!("branch '{}' already exists in this chapter", branch.name)
            })
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "branch '{}' was not found",
                branch.branch_id
            )));
        }

        Ok(branch)
    }
}
