//! Authorization gate for chapter resources.
//!
//! Every decision loads the actor's active assignments fresh from the store,
//! so a grant or revocation takes effect on the next request.

mod access;
mod requirements;


use std::sync::Arc;

use chapterdesk_core::{AppError, AppResult, UserId, UserIdentity};
use chapterdesk_domain::{
    BranchId, EffectivePermissionSet, ResolvedAssignment, RoleCapability, RoleTaxonomy,
    resolve_scope,
};
use tracing::warn;

use crate::AssignmentRepository;

pub use access::SubjectAccess;
pub use requirements::AccessRequirement;

/// Application service resolving subject access and enforcing requirements.
#[derive(Clone)]
pub struct AuthorizationService {
    assignment_repository: Arc<dyn AssignmentRepository>,
    taxonomy: Arc<RoleTaxonomy>,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        assignment_repository: Arc<dyn AssignmentRepository>,
        taxonomy: Arc<RoleTaxonomy>,
    ) -> Self {
        Self {
            assignment_repository,
            taxonomy,
        }
    }

    /// Returns the role taxonomy used for capability lookups.
    #[must_use]
    pub fn taxonomy(&self) -> &RoleTaxonomy {
        &self.taxonomy
    }

    /// Loads the subject's active assignments and derives permissions and scope.
    ///
    /// Assignments whose role is deactivated are dropped before aggregation.
    pub async fn resolve_access(&self, subject: UserId) -> AppResult<SubjectAccess> {
        let assignments: Vec<ResolvedAssignment> = self
            .assignment_repository
            .list_assignments_for_subject(subject, true)
            .await?
            .into_iter()
            .filter(|assignment| assignment.is_active() && assignment.role.is_active)
            .collect();

        let permissions =
            EffectivePermissionSet::aggregate(assignments.iter().map(|assignment| &assignment.role));
        let scope = resolve_scope(&assignments, &self.taxonomy);

        Ok(SubjectAccess {
            subject,
            assignments,
            permissions,
            scope,
        })
    }

    /// Resolves access for an approved actor.
    pub async fn resolve_actor(&self, actor: &UserIdentity) -> AppResult<SubjectAccess> {
        if !actor.is_approved() {
            return Err(AppError::Forbidden("account not approved".to_owned()));
        }

        self.resolve_access(actor.user_id()).await
    }

    /// Ensures the actor satisfies the requirement.
    pub async fn authorize(
        &self,
        actor: &UserIdentity,
        requirement: &AccessRequirement,
    ) -> AppResult<SubjectAccess> {
        let access = self.resolve_actor(actor).await?;

        if !requirement.is_satisfied_by(&access) {
            warn!(
                subject = %actor.user_id(),
                requirement = %requirement,
                "access requirement not met"
            );
            return Err(AppError::Forbidden(format!(
                "subject '{}' does not satisfy {requirement}",
                actor.user_id()
            )));
        }

        Ok(access)
    }

    /// Ensures the actor satisfies the requirement and may act on the branch.
    pub async fn authorize_in_branch(
        &self,
        actor: &UserIdentity,
        requirement: &AccessRequirement,
        branch_id: BranchId,
    ) -> AppResult<SubjectAccess> {
        let access = self.authorize(actor, requirement).await?;

        if !access.scope.permits(branch_id) {
            warn!(
                subject = %actor.user_id(),
                branch_id = %branch_id,
                "branch outside subject scope"
            );
            return Err(AppError::Forbidden(format!(
                "subject '{}' has no access to branch '{branch_id}'",
                actor.user_id()
            )));
        }

        Ok(access)
    }

    /// Requirement passed by holders of any role carrying the capability.
    #[must_use]
    pub fn capability(&self, capability: RoleCapability) -> AccessRequirement {
        AccessRequirement::AnyRole(self.taxonomy.roles_with(capability))
    }

    /// Requirement passed by chapter or branch leadership.
    #[must_use]
    pub fn any_leadership(&self) -> AccessRequirement {
        AccessRequirement::AnyRole(self.taxonomy.any_leadership())
    }
}
