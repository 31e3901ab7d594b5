//! Role catalog administration.


use std::collections::BTreeMap;
use std::sync::Arc;

use chapterdesk_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use chapterdesk_domain::{AuditAction, RoleDefinition, RoleId, actions};
use tracing::info;

use crate::{
    AccessRequirement, AuditEvent, AuditRepository, AuthorizationService, CreateRoleInput,
    RoleFilter, RoleRepository, UpdateRoleInput,
};

/// Category label shared by one or more active roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCategory {
    /// Category label.
    pub name: String,
    /// Active roles carrying the label.
    pub role_count: usize,
}

/// Resource guarding role catalog writes.
const ROLES_RESOURCE: &str = "roles";

/// Application service for the role catalog.
#[derive(Clone)]
pub struct RoleService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleService {
    /// Creates a new role service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_repository: Arc<dyn RoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            role_repository,
            audit_repository,
        }
    }

    /// Lists active roles matching the filter, sorted by name.
    pub async fn list_roles(
        &self,
        actor: &UserIdentity,
        filter: RoleFilter,
    ) -> AppResult<Vec<RoleDefinition>> {
        self.authorization_service.resolve_actor(actor).await?;

        let filter = RoleFilter {
            include_inactive: false,
            ..filter
        };
        let mut roles = self.role_repository.list_roles(&filter).await?;
        roles.retain(|role| role.is_active);
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    /// Lists the categories used by active roles, sorted by name.
    pub async fn list_role_categories(&self, actor: &UserIdentity) -> AppResult<Vec<RoleCategory>> {
        let roles = self.list_roles(actor, RoleFilter::default()).await?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for category in roles.into_iter().filter_map(|role| role.category) {
            *counts.entry(category).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(name, role_count)| RoleCategory { name, role_count })
            .collect())
    }

    /// Returns one role.
    pub async fn get_role(&self, actor: &UserIdentity, role_id: RoleId) -> AppResult<RoleDefinition> {
        self.authorization_service.resolve_actor(actor).await?;
        self.find_role(role_id).await
    }

    /// Creates a role and emits an audit event.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<RoleDefinition> {
        self.require_role_write(actor).await?;

        let role = self
            .role_repository
            .create_role(RoleDefinition {
                role_id: RoleId::new(),
                name: NonEmptyString::new(input.name)?,
                scope_kind: input.scope_kind,
                category: normalize_optional(input.category),
                description: normalize_optional(input.description),
                permissions: input.permissions,
                is_active: true,
            })
            .await?;

        self.append_role_event(actor, AuditAction::RoleCreated, &role, "created")
            .await?;
        info!(actor = %actor.user_id(), role = role.name(), "role created");

        Ok(role)
    }

    /// Updates a role and emits an audit event.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<RoleDefinition> {
        self.require_role_write(actor).await?;

        let mut role = self.find_role(role_id).await?;
        if let Some(name) = input.name {
            role.name = NonEmptyString::new(name)?;
        }
        if let Some(category) = input.category {
            role.category = normalize_optional(Some(category));
        }
        if let Some(description) = input.description {
            role.description = normalize_optional(Some(description));
        }
        if let Some(permissions) = input.permissions {
            role.permissions = permissions;
        }
        if let Some(is_active) = input.is_active {
            role.is_active = is_active;
        }

        let role = self.role_repository.save_role(role).await?;

        self.append_role_event(actor, AuditAction::RoleUpdated, &role, "updated")
            .await?;
        info!(actor = %actor.user_id(), role = role.name(), "role updated");

        Ok(role)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<RoleDefinition> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' not found")))
    }

    async fn require_role_write(&self, actor: &UserIdentity) -> AppResult<()> {
        self.authorization_service
            .authorize(
                actor,
                &AccessRequirement::permission(ROLES_RESOURCE, [actions::WRITE]),
            )
            .await
            .map(|_| ())
    }

    async fn append_role_event(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        role: &RoleDefinition,
        verb: &str,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id(),
                action,
                resource_type: "role".to_owned(),
                resource_id: role.role_id.to_string(),
                detail: Some(format!("{verb} role '{}'", role.name())),
            })
            .await
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
