use std::str::FromStr;

use chapterdesk_core::AppError;
use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is assigned to a subject.
    AssignmentGranted,
    /// Emitted when an assignment is modified.
    AssignmentUpdated,
    /// Emitted when an assignment is deactivated.
    AssignmentRevoked,
    /// Emitted when a role definition is created.
    RoleCreated,
    /// Emitted when a role definition is modified.
    RoleUpdated,
    /// Emitted when a branch is created.
    BranchCreated,
    /// Emitted when a branch is modified.
    BranchUpdated,
    /// Emitted when a branch is deactivated.
    BranchDeactivated,
    /// Emitted when a member is added to a branch.
    MembershipAdded,
    /// Emitted when a branch membership is approved.
    MembershipApproved,
    /// Emitted when a membership card is issued.
    MembershipCardIssued,
    /// Emitted when a membership's status or card flag is edited.
    MembershipUpdated,
    /// Emitted when a user edits their own profile.
    UserProfileUpdated,
    /// Emitted when a user account status changes.
    UserStatusChanged,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssignmentGranted => "assignment.granted",
            Self::AssignmentUpdated => "assignment.updated",
            Self::AssignmentRevoked => "assignment.revoked",
            Self::RoleCreated => "role.created",
            Self::RoleUpdated => "role.updated",
            Self::BranchCreated => "branch.created",
            Self::BranchUpdated => "branch.updated",
            Self::BranchDeactivated => "branch.deactivated",
            Self::MembershipAdded => "membership.added",
            Self::MembershipApproved => "membership.approved",
            Self::MembershipCardIssued => "membership.card_issued",
            Self::MembershipUpdated => "membership.updated",
            Self::UserProfileUpdated => "user.profile_updated",
            Self::UserStatusChanged => "user.status_changed",
        }
    }

    /// Returns every known action.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditAction] = &[
            AuditAction::AssignmentGranted,
            AuditAction::AssignmentUpdated,
            AuditAction::AssignmentRevoked,
            AuditAction::RoleCreated,
            AuditAction::RoleUpdated,
            AuditAction::BranchCreated,
            AuditAction::BranchUpdated,
            AuditAction::BranchDeactivated,
            AuditAction::MembershipAdded,
            AuditAction::MembershipApproved,
            AuditAction::MembershipCardIssued,
            AuditAction::MembershipUpdated,
            AuditAction::UserProfileUpdated,
            AuditAction::UserStatusChanged,
        ];

        ALL
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown audit action '{value}'")))
    }
}
