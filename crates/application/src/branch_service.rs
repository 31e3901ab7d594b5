//! Branches and branch memberships.
//!
//! Writes to a branch require leadership and, for branch leaders, that the
//! branch lies in their scope. Chapter leaders hold the `All` scope.

mod branches;
mod members;


use std::sync::Arc;

use chapterdesk_core::{AppError, AppResult, UserIdentity};
use chapterdesk_domain::{AuditAction, BranchDefinition, BranchId};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, BranchRepository, MembershipRepository,
};

/// Application service for branch and membership workflows.
#[derive(Clone)]
pub struct BranchService {
    authorization_service: AuthorizationService,
    branch_repository: Arc<dyn BranchRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl BranchService {
    /// Creates a new branch service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        branch_repository: Arc<dyn BranchRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            branch_repository,
            membership_repository,
            audit_repository,
        }
    }

    async fn find_branch(&self, branch_id: BranchId) -> AppResult<BranchDefinition> {
        self.branch_repository
            .find_branch(branch_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("branch '{branch_id}' not found")))
    }

    async fn append_event(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id(),
                action,
                resource_type: resource_type.to_owned(),
                resource_id,
                detail: Some(detail),
            })
            .await
    }
}
