use chapterdesk_core::AppError;
use chapterdesk_domain::RoleCapability;
use tracing::warn;

use crate::GrantAssignmentInput;

use super::*;

/// Result of one item of a bulk grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkGrantOutcome {
    /// The assignment was created.
    Granted(ExecutiveAssignment),
    /// The item failed. Later items were still processed.
    Failed {
        /// Position of the item in the request.
        index: usize,
        /// Failure cause.
        error: AppError,
    },
}

impl BulkGrantOutcome {
    /// Returns the created assignment, if any.
    #[must_use]
    pub fn assignment(&self) -> Option<&ExecutiveAssignment> {
        match self {
            Self::Granted(assignment) => Some(assignment),
            Self::Failed { .. } => None,
        }
    }
}

impl AssignmentService {
    /// Grants each item in order. Items are independent: a failure is recorded
    /// in its outcome and processing continues.
    ///
    /// Requires chapter leadership; every item is then subject to the same
    /// checks as [`AssignmentService::grant`].
    pub async fn bulk_grant(
        &self,
        actor: &UserIdentity,
        inputs: Vec<GrantAssignmentInput>,
    ) -> AppResult<Vec<BulkGrantOutcome>> {
        let requirement = self
            .authorization_service
            .capability(RoleCapability::ChapterLeadership);
        self.authorization_service
            .authorize(actor, &requirement)
            .await?;

        let mut outcomes = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            match self.grant(actor, input).await {
                Ok(assignment) => outcomes.push(BulkGrantOutcome::Granted(assignment)),
                Err(error) => {
                    warn!(actor = %actor.user_id(), index, %error, "bulk grant item failed");
                    outcomes.push(BulkGrantOutcome::Failed { index, error });
                }
            }
        }

        Ok(outcomes)
    }
}
