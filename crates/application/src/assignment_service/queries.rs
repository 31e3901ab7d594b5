use chapterdesk_core::UserId;
use chapterdesk_domain::{ResolvedAssignment, RoleCapability};

use crate::SubjectAccess;

use super::*;

impl AssignmentService {
    /// Returns one assignment. Requires chapter or branch leadership.
    pub async fn get_assignment(
        &self,
        actor: &UserIdentity,
        assignment_id: AssignmentId,
    ) -> AppResult<ExecutiveAssignment> {
        let requirement = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize(actor, &requirement)
            .await?;

        self.find_assignment(assignment_id).await
    }

    /// Lists a subject's assignments.
    ///
    /// Subjects may list their own; listing another subject's needs a role
    /// with the `view_assignments` capability.
    pub async fn list_subject_assignments(
        &self,
        actor: &UserIdentity,
        subject: UserId,
        active_only: bool,
    ) -> AppResult<Vec<ResolvedAssignment>> {
        self.require_viewer(actor, subject).await?;

        self.assignment_repository
            .list_assignments_for_subject(subject, active_only)
            .await
    }

    /// Resolves another subject's effective permissions and scope.
    ///
    /// Same visibility rule as [`Self::list_subject_assignments`].
    pub async fn subject_access(
        &self,
        actor: &UserIdentity,
        subject: UserId,
    ) -> AppResult<SubjectAccess> {
        self.require_viewer(actor, subject).await?;
        self.authorization_service.resolve_access(subject).await
    }

    async fn require_viewer(&self, actor: &UserIdentity, subject: UserId) -> AppResult<()> {
        if actor.user_id() == subject {
            self.authorization_service.resolve_actor(actor).await?;
        } else {
            let requirement = self
                .authorization_service
                .capability(RoleCapability::ViewAssignments);
            self.authorization_service
                .authorize(actor, &requirement)
                .await?;
        }

        Ok(())
    }

    /// Lists the actor's active assignments.
    pub async fn list_my_assignments(
        &self,
        actor: &UserIdentity,
    ) -> AppResult<Vec<ResolvedAssignment>> {
        self.list_subject_assignments(actor, actor.user_id(), true)
            .await
    }
}
