use async_trait::async_trait;
use chrono::Utc;

use chapterdesk_application::{AssignmentRepository, RoleFilter, RoleRepository};
use chapterdesk_core::{AppError, AppResult, UserId};
use chapterdesk_domain::{
    AssignmentId, AssignmentPatch, ExecutiveAssignment, NewAssignment, ResolvedAssignment,
    RoleDefinition, RoleId,
};

use super::{InMemoryStore, StoreState};

impl StoreState {
    fn role_name_taken(&self, role: &RoleDefinition) -> bool {
        self.roles
            .values()
            .any(|stored| stored.role_id != role.role_id && stored.name == role.name)
    }

    fn holds_active(&self, subject: UserId, role_id: RoleId, except: Option<AssignmentId>) -> bool {
        self.assignments.values().any(|stored| {
            stored.is_active
                && stored.subject == subject
                && stored.role_id == role_id
                && Some(stored.assignment_id) != except
        })
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn list_roles(&self, filter: &RoleFilter) -> AppResult<Vec<RoleDefinition>> {
        let state = self.state.read().await;

        let mut roles: Vec<RoleDefinition> = state
            .roles
            .values()
            .filter(|role| filter.include_inactive || role.is_active)
            .filter(|role| filter.scope_kind.is_none_or(|kind| role.scope_kind == kind))
            .filter(|role| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|category| role.category.as_ref() == Some(category))
            })
            .cloned()
            .collect();
        roles.sort_by(|left, right| left.name.cmp(&right.name));

        Ok(roles)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        Ok(self.state.read().await.roles.get(&role_id).cloned())
    }

    async fn create_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;

        if state.role_name_taken(&role) || state.roles.contains_key(&role.role_id) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        state.roles.insert(role.role_id, role.clone());
        Ok(role)
    }

    async fn save_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition> {
        let mut state = self.state.write().await;

        if !state.roles.contains_key(&role.role_id) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.role_id
            )));
        }
        if state.role_name_taken(&role) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        state.roles.insert(role.role_id, role.clone());
        Ok(role)
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryStore {
    async fn insert_active_assignment(
        &self,
        assignment: NewAssignment,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        let mut state = self.state.write().await;

        if state.holds_active(assignment.subject, assignment.role_id, None) {
            return Ok(None);
        }

        let stored = assignment.into_assignment(AssignmentId::new(), Utc::now());
        state
            .assignments
            .insert(stored.assignment_id, stored.clone());

        Ok(Some(stored))
    }

    async fn find_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .get(&assignment_id)
            .cloned())
    }

    async fn update_assignment(
        &self,
        assignment_id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> AppResult<Option<ExecutiveAssignment>> {
        let mut state = self.state.write().await;

        let Some(current) = state.assignments.get(&assignment_id).cloned() else {
            return Ok(None);
        };

        if patch.reactivates(&current)
            && state.holds_active(current.subject, current.role_id, Some(assignment_id))
        {
            return Err(AppError::Conflict(format!(
                "subject '{}' already holds an active assignment of role '{}'",
                current.subject, current.role_id
            )));
        }

        let mut updated = current;
        patch.apply_to(&mut updated, Utc::now());
        state.assignments.insert(assignment_id, updated.clone());

        Ok(Some(updated))
    }

    async fn list_assignments_for_subject(
        &self,
        subject: UserId,
        active_only: bool,
    ) -> AppResult<Vec<ResolvedAssignment>> {
        let state = self.state.read().await;

        let mut resolved: Vec<ResolvedAssignment> = state
            .assignments
            .values()
            .filter(|assignment| assignment.subject == subject)
            .filter(|assignment| !active_only || assignment.is_active)
            .filter_map(|assignment| {
                state
                    .roles
                    .get(&assignment.role_id)
                    .map(|role| ResolvedAssignment {
                        assignment: assignment.clone(),
                        role: role.clone(),
                    })
            })
            .collect();
        resolved.sort_by(|left, right| {
            right
                .assignment
                .created_at
                .cmp(&left.assignment.created_at)
        });

        Ok(resolved)
    }
}
