//! Executive assignment lifecycle: grant, update, revoke, bulk grant.
//!
//! Duplicate prevention lives in the store: the repository inserts or
//! reactivates an assignment only when the subject holds no other active
//! assignment of the same role, as one atomic operation.

mod bulk;
mod lifecycle;
mod policy;
mod queries;


use std::sync::Arc;

use chapterdesk_core::{AppError, AppResult, UserIdentity};
use chapterdesk_domain::{AssignmentId, ExecutiveAssignment};

use crate::{AssignmentRepository, AuditRepository, AuthorizationService, RoleRepository};

pub use bulk::BulkGrantOutcome;
pub use policy::{GrantContext, GrantPolicy, TaxonomyGrantPolicy};

/// Application service for executive assignments.
#[derive(Clone)]
pub struct AssignmentService {
    authorization_service: AuthorizationService,
    role_repository: Arc<dyn RoleRepository>,
    assignment_repository: Arc<dyn AssignmentRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    grant_policy: Arc<dyn GrantPolicy>,
}

impl AssignmentService {
    /// Creates a new assignment service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_repository: Arc<dyn RoleRepository>,
        assignment_repository: Arc<dyn AssignmentRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        grant_policy: Arc<dyn GrantPolicy>,
    ) -> Self {
        Self {
            authorization_service,
            role_repository,
            assignment_repository,
            audit_repository,
            grant_policy,
        }
    }

    async fn find_assignment(&self, assignment_id: AssignmentId) -> AppResult<ExecutiveAssignment> {
        self.assignment_repository
            .find_assignment(assignment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("assignment '{assignment_id}' not found")))
    }

    fn denied(actor: &UserIdentity, verb: &str, assignment_id: AssignmentId) -> AppError {
        AppError::Forbidden(format!(
            "subject '{}' may not {verb} assignment '{assignment_id}'",
            actor.user_id()
        ))
    }
}
