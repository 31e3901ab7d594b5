//! PostgreSQL-backed executive assignments.
//!
//! The partial unique index `(subject, role_id) WHERE is_active` carries the
//! one-active-assignment invariant, so concurrent grants race on the index
//! rather than on a read-then-write check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use chapterdesk_application::AssignmentRepository;
use chapterdesk_core::{AppError, AppResult, UserId};
use chapterdesk_domain::{
    AssignmentId, AssignmentPatch, BranchId, ChapterId, ExecutiveAssignment, NewAssignment,
    ResolvedAssignment, RoleDefinition, RoleId,
};

use crate::postgres_role_repository::RoleRow;
use crate::postgres_rows::{conflict_or_internal, internal};


/// PostgreSQL implementation of the assignment repository port.
#[derive(Clone)]
pub struct PostgresAssignmentRepository {
    pool: PgPool,
}

impl PostgresAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    id: uuid::Uuid,
    subject: uuid::Uuid,
    role_id: uuid::Uuid,
    chapter_id: Option<uuid::Uuid>,
    branch_id: Option<uuid::Uuid>,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    is_active: bool,
    granted_by: uuid::Uuid,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AssignmentRow> for ExecutiveAssignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            assignment_id: AssignmentId::from_uuid(row.id),
            subject: UserId::from_uuid(row.subject),
            role_id: RoleId::from_uuid(row.role_id),
            chapter_id: row.chapter_id.map(ChapterId::from_uuid),
            branch_id: row.branch_id.map(BranchId::from_uuid),
            start_date: row.start_date,
            end_date: row.end_date,
            is_active: row.is_active,
            granted_by: UserId::from_uuid(row.granted_by),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct ResolvedRow {
    #[sqlx(flatten)]
    assignment: AssignmentRow,
    #[sqlx(flatten)]
    role: RoleRow,
}

const ASSIGNMENT_COLUMNS: &str = r#"
    id, subject, role_id, chapter_id, branch_id, start_date, end_date,
    is_active, granted_by, notes, created_at, updated_at
"#;

#[async_trait]
impl AssignmentRepository for PostgresAssignmentRepository {
    async fn insert_active_assignment(
        &self,
        assignment: NewAssignment,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        let stored = assignment.into_assignment(AssignmentId::new(), Utc::now());

        let inserted = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO executive_assignments (
                id, subject, role_id, chapter_id, branch_id, start_date, end_date,
                is_active, granted_by, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, true, $8, $9, $10, $10)
            ON CONFLICT (subject, role_id) WHERE is_active DO NOTHING
            RETURNING id
            "#,
        )
        .bind(stored.assignment_id.as_uuid())
        .bind(stored.subject.as_uuid())
        .bind(stored.role_id.as_uuid())
        .bind(stored.chapter_id.map(|id| id.as_uuid()))
        .bind(stored.branch_id.map(|id| id.as_uuid()))
        .bind(stored.start_date)
        .bind(stored.end_date)
        .bind(stored.granted_by.as_uuid())
        .bind(stored.notes.as_deref())
        .bind(stored.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("insert assignment"))?;

        Ok(inserted.map(|_| stored))
    }

    async fn find_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        let query = format!("SELECT {ASSIGNMENT_COLUMNS} FROM executive_assignments WHERE id = $1");

        Ok(sqlx::query_as::<_, AssignmentRow>(query.as_str())
            .bind(assignment_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(internal("find assignment"))?
            .map(ExecutiveAssignment::from))
    }

    async fn update_assignment(
        &self,
        assignment_id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("begin transaction"))?;

        let query = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM executive_assignments WHERE id = $1 FOR UPDATE"
        );
        let Some(row) = sqlx::query_as::<_, AssignmentRow>(query.as_str())
            .bind(assignment_id.as_uuid())
            .fetch_optional(&mut *transaction)
            .await
            .map_err(internal("lock assignment"))?
        else {
            return Ok(None);
        };

        let mut assignment = ExecutiveAssignment::from(row);
        patch.apply_to(&mut assignment, Utc::now());

        sqlx::query(
            r#"
            UPDATE executive_assignments
            SET end_date = $2,
                is_active = $3,
                notes = $4,
                updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(assignment.assignment_id.as_uuid())
        .bind(assignment.end_date)
        .bind(assignment.is_active)
        .bind(assignment.notes.as_deref())
        .bind(assignment.updated_at)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "update assignment", || {
                format!(
                    "subject '{}' already holds an active assignment of role '{}'",
                    assignment.subject, assignment.role_id
                )
            })
        })?;

        transaction
            .commit()
            .await
            .map_err(internal("commit transaction"))?;

        Ok(Some(assignment))
    }

    async fn list_assignments_for_subject(
        &self,
        subject: UserId,
        active_only: bool,
    ) -> AppResult<Vec<ResolvedAssignment>> {
        let rows = sqlx::query_as::<_, ResolvedRow>(
            r#"
            SELECT
                assignments.id,
                assignments.subject,
                assignments.role_id,
                assignments.chapter_id,
                assignments.branch_id,
                assignments.start_date,
                assignments.end_date,
                assignments.is_active,
                assignments.granted_by,
                assignments.notes,
                assignments.created_at,
                assignments.updated_at,
                roles.name AS role_name,
                roles.scope_kind,
                roles.category,
                roles.description,
                roles.permissions,
                roles.is_active AS role_is_active
            FROM executive_assignments AS assignments
            INNER JOIN roles ON roles.id = assignments.role_id
            WHERE assignments.subject = $1
                AND (NOT $2 OR assignments.is_active)
            ORDER BY assignments.created_at DESC
            "#,
        )
        .bind(subject.as_uuid())
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list assignments"))?;

        rows.into_iter()
            .map(|row| {
                Ok(ResolvedAssignment {
                    role: RoleDefinition::try_from(row.role)?,
                    assignment: ExecutiveAssignment::from(row.assignment),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()
    }
}
