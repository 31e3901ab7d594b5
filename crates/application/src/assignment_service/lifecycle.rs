use chapterdesk_domain::{AssignmentPatch, AuditAction, NewAssignment, RoleCapability};
use chrono::Utc;
use tracing::{info, warn};

use crate::{AuditEvent, GrantAssignmentInput};

use super::*;

impl AssignmentService {
    /// Grants a role to a subject.
    ///
    /// Checks, in order: the grantor's authority (before the role is looked
    /// up), the grant policy for the resolved role, the role being active, the
    /// scope invariant of its kind, and finally the absence of an active
    /// assignment of the same role for the subject.
    pub async fn grant(
        &self,
        actor: &UserIdentity,
        input: GrantAssignmentInput,
    ) -> AppResult<ExecutiveAssignment> {
        let grantor = self.authorization_service.resolve_actor(actor).await?;
        if !self.grant_policy.may_grant(&grantor) {
            warn!(grantor = %actor.user_id(), subject = %input.subject, "grant refused by policy");
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not grant roles",
                actor.user_id()
            )));
        }

        let role = self
            .role_repository
            .find_role(input.role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{}' not found", input.role_id)))?;

        let context = GrantContext {
            subject: input.subject,
            role: &role,
            chapter_id: input.chapter_id,
            branch_id: input.branch_id,
        };
        if !self.grant_policy.can_grant(&grantor, &context) {
            warn!(
                grantor = %actor.user_id(),
                subject = %input.subject,
                role = role.name(),
                "grant refused by policy"
            );
            return Err(AppError::Forbidden(format!(
                "subject '{}' may not grant role '{}'",
                actor.user_id(),
                role.name()
            )));
        }

        if !role.is_active {
            return Err(AppError::Validation(format!(
                "role '{}' is inactive and cannot be granted",
                role.name()
            )));
        }

        let new_assignment = NewAssignment {
            subject: input.subject,
            role_id: role.role_id,
            chapter_id: input.chapter_id,
            branch_id: input.branch_id,
            start_date: input.start_date.unwrap_or_else(Utc::now),
            end_date: input.end_date,
            granted_by: actor.user_id(),
            notes: input.notes,
        };
        new_assignment.validate_for_role(&role)?;

        let Some(assignment) = self
            .assignment_repository
            .insert_active_assignment(new_assignment)
            .await?
        else {
            return Err(AppError::Conflict(format!(
                "subject '{}' already holds an active '{}' assignment",
                input.subject,
                role.name()
            )));
        };

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id(),
                action: AuditAction::AssignmentGranted,
                resource_type: "assignment".to_owned(),
                resource_id: assignment.assignment_id.to_string(),
                detail: Some(format!(
                    "granted role '{}' to '{}'",
                    role.name(),
                    assignment.subject
                )),
            })
            .await?;

        info!(
            grantor = %actor.user_id(),
            subject = %assignment.subject,
            role = role.name(),
            assignment_id = %assignment.assignment_id,
            "assignment granted"
        );

        Ok(assignment)
    }

    /// Applies a partial update to an assignment.
    pub async fn update(
        &self,
        actor: &UserIdentity,
        assignment_id: AssignmentId,
        patch: AssignmentPatch,
    ) -> AppResult<ExecutiveAssignment> {
        self.apply_patch(
            actor,
            assignment_id,
            |_| patch,
            AuditAction::AssignmentUpdated,
            "update",
        )
        .await
    }

    /// Deactivates an assignment and stamps its end date. Never deletes.
    ///
    /// A term that has not started yet ends at its start date.
    pub async fn revoke(
        &self,
        actor: &UserIdentity,
        assignment_id: AssignmentId,
    ) -> AppResult<ExecutiveAssignment> {
        self.apply_patch(
            actor,
            assignment_id,
            |current| AssignmentPatch::revocation(Utc::now().max(current.start_date)),
            AuditAction::AssignmentRevoked,
            "revoke",
        )
        .await
    }

    async fn apply_patch(
        &self,
        actor: &UserIdentity,
        assignment_id: AssignmentId,
        build_patch: impl FnOnce(&ExecutiveAssignment) -> AssignmentPatch,
        action: AuditAction,
        verb: &str,
    ) -> AppResult<ExecutiveAssignment> {
        let current = self.find_assignment(assignment_id).await?;
        self.require_updater(actor, &current, verb).await?;

        let patch = build_patch(&current);
        if patch.is_empty() {
            return Ok(current);
        }
        patch.validate_against(&current)?;

        let updated = self
            .assignment_repository
            .update_assignment(assignment_id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("assignment '{assignment_id}' not found")))?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id(),
                action,
                resource_type: "assignment".to_owned(),
                resource_id: assignment_id.to_string(),
                detail: Some(format!(
                    "{verb}d assignment of '{}' (active={})",
                    updated.subject, updated.is_active
                )),
            })
            .await?;

        info!(
            actor = %actor.user_id(),
            %assignment_id,
            is_active = updated.is_active,
            "assignment {verb}d"
        );

        Ok(updated)
    }

    /// Updater rule: a role with `manage_assignments`, or a role with
    /// `manage_branch_assignments` held in the target assignment's branch.
    async fn require_updater(
        &self,
        actor: &UserIdentity,
        target: &ExecutiveAssignment,
        verb: &str,
    ) -> AppResult<()> {
        let access = self.authorization_service.resolve_actor(actor).await?;
        let taxonomy = self.authorization_service.taxonomy();

        let chapter_manager = access.has_capability(taxonomy, RoleCapability::ManageAssignments);
        let branch_manager = target.branch_id.is_some_and(|branch_id| {
            access.has_capability_in_branch(
                taxonomy,
                RoleCapability::ManageBranchAssignments,
                branch_id,
            )
        });

        if chapter_manager || branch_manager {
            return Ok(());
        }

        warn!(
            actor = %actor.user_id(),
            assignment_id = %target.assignment_id,
            "assignment {verb} refused"
        );
        Err(Self::denied(actor, verb, target.assignment_id))
    }
}
