use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use chapterdesk_application::{RoleFilter, RoleRepository};
use chapterdesk_core::{AppError, AppResult, NonEmptyString};
use chapterdesk_domain::{PermissionMap, RoleDefinition, RoleId, RoleScopeKind};

use crate::postgres_rows::{conflict_or_internal, corrupt_column, internal};

/// PostgreSQL-backed role catalog.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    pub(crate) role_id: uuid::Uuid,
    pub(crate) role_name: String,
    pub(crate) scope_kind: String,
    pub(crate) category: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) permissions: serde_json::Value,
    pub(crate) role_is_active: bool,
}

impl TryFrom<RoleRow> for RoleDefinition {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            role_id: RoleId::from_uuid(row.role_id),
            name: NonEmptyString::new(row.role_name).map_err(corrupt_column("roles.name"))?,
            scope_kind: RoleScopeKind::from_str(row.scope_kind.as_str())
                .map_err(corrupt_column("roles.scope_kind"))?,
            category: row.category,
            description: row.description,
            permissions: PermissionMap::from_json(&row.permissions),
            is_active: row.role_is_active,
        })
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_roles(&self, filter: &RoleFilter) -> AppResult<Vec<RoleDefinition>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                id AS role_id,
                name AS role_name,
                scope_kind,
                category,
                description,
                permissions,
                is_active AS role_is_active
            FROM roles
            WHERE ($1 OR is_active)
                AND ($2::TEXT IS NULL OR scope_kind = $2)
                AND ($3::TEXT IS NULL OR category = $3)
            ORDER BY name
            "#,
        )
        .bind(filter.include_inactive)
        .bind(filter.scope_kind.map(|kind| kind.as_str()))
        .bind(filter.category.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list roles"))?;

        rows.into_iter().map(RoleDefinition::try_from).collect()
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                id AS role_id,
                name AS role_name,
                scope_kind,
                category,
                description,
                permissions,
                is_active AS role_is_active
            FROM roles
            WHERE id = $1
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find role"))?
        .map(RoleDefinition::try_from)
        .transpose()
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, scope_kind, category, description, permissions, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role.role_id.as_uuid())
        .bind(role.name())
        .bind(role.scope_kind.as_str())
        .bind(role.category.as_deref())
        .bind(role.description.as_deref())
        .bind(role.permissions.to_json())
        .bind(role.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "create role", || {
                format!("role '{}' already exists", role.name())
            })
        })?;

        Ok(role)
    }

    async fn save_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition> {
        let result = sqlx::query(
            r#"
            UPDATE roles
            SET name = $2,
                scope_kind = $3,
                category = $4,
                description = $5,
                permissions = $6,
                is_active = $7
            WHERE id = $1
            "#,
        )
        .bind(role.role_id.as_uuid())
        .bind(role.name())
        .bind(role.scope_kind.as_str())
        .bind(role.category.as_deref())
        .bind(role.description.as_deref())
        .bind(role.permissions.to_json())
        .bind(role.is_active)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(error, "save role", || {
                format!("role '{}' already exists", role.name())
            })
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.role_id
            )));
        }

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use chapterdesk_core::AppError;

    use super::RoleRow;
    use chapterdesk_domain::{PermissionGrant, RoleDefinition, RoleScopeKind};

    fn row(scope_kind: &str, permissions: serde_json::Value) -> RoleRow {
        RoleRow {
            role_id: uuid::Uuid::new_v4(),
            role_name: "Chairman".to_owned(),
            scope_kind: scope_kind.to_owned(),
            category: Some("Executive".to_owned()),
            description: None,
            permissions,
            role_is_active: true,
        }
    }

    #[test]
    fn role_row_decodes_lenient_permission_document() {
        let role = RoleDefinition::try_from(row(
            "chapter",
            serde_json::json!({"roles": true, "members": ["read", "approve"], "events": 7}),
        ))
        .unwrap_or_else(|error| panic!("decode failed: {error}"));

        assert_eq!(role.scope_kind, RoleScopeKind::Chapter);
        assert_eq!(role.permissions.get("roles"), Some(&PermissionGrant::All));
        assert!(
            role.permissions
                .get("members")
                .is_some_and(|grant| grant.allows("approve"))
        );
        assert_eq!(role.permissions.get("events"), Some(&PermissionGrant::NoGrant));
    }

    #[test]
    fn unknown_scope_kind_is_internal_error() {
        let decoded = RoleDefinition::try_from(row("regional", serde_json::json!({})));

        assert!(matches!(decoded, Err(AppError::Internal(message)) if message.contains("scope_kind")));
    }
}
