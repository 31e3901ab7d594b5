use async_trait::async_trait;

use chapterdesk_core::{AppResult, UserId};
use chapterdesk_domain::{
    AssignmentId, AssignmentPatch, ExecutiveAssignment, NewAssignment, ResolvedAssignment,
    RoleDefinition, RoleId,
};

use super::RoleFilter;

/// Repository port for the role catalog.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles matching the filter.
    async fn list_roles(&self, filter: &RoleFilter) -> AppResult<Vec<RoleDefinition>>;

    /// Finds one role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>>;

    /// Persists a new role. Fails with `Conflict` when the name is taken.
    async fn create_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition>;

    /// Replaces a stored role. Fails with `NotFound` or `Conflict` on a name clash.
    async fn save_role(&self, role: RoleDefinition) -> AppResult<RoleDefinition>;
}

/// Repository port for executive assignments.
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Inserts the assignment unless the subject already holds an active
    /// assignment of the same role.
    ///
    /// The check and the insert form one atomic operation. Returns `None` when
    /// a duplicate active assignment exists.
    async fn insert_active_assignment(
        &self,
        assignment: NewAssignment,
    ) -> AppResult<Option<ExecutiveAssignment>>;

    /// Finds one assignment by id.
    async fn find_assignment(
        &self,
        assignment_id: AssignmentId,
    ) -> AppResult<Option<ExecutiveAssignment>>;

    /// Applies a patch atomically and returns the updated assignment.
    ///
    /// Returns `None` when the assignment does not exist. Fails with `Conflict`
    /// when the patch reactivates an assignment whose subject already holds
    /// another active assignment of the same role.
    async fn update_assignment(
        &self,
        assignment_id: AssignmentId,
        patch: &AssignmentPatch,
    ) -> AppResult<Option<ExecutiveAssignment>>;

    /// Lists a subject's assignments joined with their roles, newest first.
    async fn list_assignments_for_subject(
        &self,
        subject: UserId,
        active_only: bool,
    ) -> AppResult<Vec<ResolvedAssignment>>;
}
