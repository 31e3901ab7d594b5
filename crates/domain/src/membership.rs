use std::str::FromStr;

use chapterdesk_core::{AppError, AppResult, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BranchId, MembershipId};

/// Membership lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Waiting for branch approval.
    Pending,
    /// Approved member.
    Active,
    /// Dues or term lapsed.
    Lapsed,
    /// Temporarily barred.
    Suspended,
}

impl MembershipStatus {
    /// Returns a stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Lapsed => "lapsed",
            Self::Suspended => "suspended",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "lapsed" => Ok(Self::Lapsed),
            "suspended" => Ok(Self::Suspended),
            _ => Err(AppError::Validation(format!(
                "unknown membership status '{value}'"
            ))),
        }
    }
}

/// A user's membership of one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    /// Stable membership identifier.
    pub membership_id: MembershipId,
    /// Member.
    pub user_id: UserId,
    /// Branch joined.
    pub branch_id: BranchId,
    /// Lifecycle state.
    pub status: MembershipStatus,
    /// Approving leader.
    pub approved_by: Option<UserId>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Whether a membership card was issued.
    pub card_issued: bool,
    /// Card issue timestamp.
    pub card_issued_at: Option<DateTime<Utc>>,
    /// Creation timestamp, doubling as join date.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Creates a pending membership.
    #[must_use]
    pub fn pending(user_id: UserId, branch_id: BranchId, now: DateTime<Utc>) -> Self {
        Self {
            membership_id: MembershipId::new(),
            user_id,
            branch_id,
            status: MembershipStatus::Pending,
            approved_by: None,
            approved_at: None,
            card_issued: false,
            card_issued_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns whether the membership is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }

    /// Marks the membership active and records the approver.
    pub fn approve(&mut self, approver: UserId, now: DateTime<Utc>) {
        self.status = MembershipStatus::Active;
        self.approved_by = Some(approver);
        self.approved_at = Some(now);
        self.updated_at = now;
    }

    /// Moves the membership to another lifecycle state.
    ///
    /// Activating a pending membership records the approver.
    pub fn transition(&mut self, status: MembershipStatus, actor: UserId, now: DateTime<Utc>) {
        if status == MembershipStatus::Active && self.status == MembershipStatus::Pending {
            self.approve(actor, now);
            return;
        }

        self.status = status;
        self.updated_at = now;
    }

    /// Clears the card flag.
    pub fn withdraw_card(&mut self, now: DateTime<Utc>) {
        self.card_issued = false;
        self.card_issued_at = None;
        self.updated_at = now;
    }

    /// Records card issuance. Only active memberships receive cards.
    pub fn issue_card(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if !self.is_active() {
            return Err(AppError::Validation(format!(
                "membership '{}' must be active before a card is issued",
                self.membership_id
            )));
        }

        self.card_issued = true;
        self.card_issued_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chapterdesk_core::UserId;
    use chrono::Utc;

    use crate::BranchId;

    use super::{Membership, MembershipStatus};

    #[test]
    fn activating_pending_membership_records_approver() {
        let approver = UserId::new();
        let mut membership = Membership::pending(UserId::new(), BranchId::new(), Utc::now());

        membership.transition(MembershipStatus::Active, approver, Utc::now());
        assert_eq!(membership.approved_by, Some(approver));

        membership.transition(MembershipStatus::Lapsed, UserId::new(), Utc::now());
        assert_eq!(membership.status, MembershipStatus::Lapsed);
        assert_eq!(membership.approved_by, Some(approver));
    }

    #[test]
    fn pending_membership_cannot_receive_card() {
        let mut membership = Membership::pending(UserId::new(), BranchId::new(), Utc::now());
        assert!(membership.issue_card(Utc::now()).is_err());
        assert!(!membership.card_issued);
    }

    #[test]
    fn approval_activates_and_records_approver() {
        let approver = UserId::new();
        let now = Utc::now();
        let mut membership = Membership::pending(UserId::new(), BranchId::new(), now);

        membership.approve(approver, now);

        assert_eq!(membership.status, MembershipStatus::Active);
        assert_eq!(membership.approved_by, Some(approver));
        assert!(membership.issue_card(now).is_ok());
        assert_eq!(membership.card_issued_at, Some(now));
    }
}
