use chapterdesk_core::UserId;
use chapterdesk_domain::{Membership, MembershipId, MembershipStatus, RoleCapability};
use chrono::Utc;
use tracing::info;

use crate::{BranchMember, MemberFilter, MembershipPatch, Page};

use super::*;

impl BranchService {
    /// Lists one page of a branch's members. Requires leadership with the
    /// branch in scope.
    pub async fn list_branch_members(
        &self,
        actor: &UserIdentity,
        branch_id: BranchId,
        filter: MemberFilter,
    ) -> AppResult<Page<BranchMember>> {
        let requirement = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize_in_branch(actor, &requirement, branch_id)
            .await?;

        self.find_branch(branch_id).await?;
        self.membership_repository
            .list_branch_members(branch_id, &filter)
            .await
    }

    /// Returns one membership. Requires leadership with its branch in scope.
    pub async fn get_membership(
        &self,
        actor: &UserIdentity,
        membership_id: MembershipId,
    ) -> AppResult<Membership> {
        let requirement = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize(actor, &requirement)
            .await?;

        let membership = self.find_membership_by_id(membership_id).await?;
        self.authorization_service
            .authorize_in_branch(actor, &requirement, membership.branch_id)
            .await?;

        Ok(membership)
    }

    /// Changes a membership's status or card flag.
    ///
    /// Requires leadership with the branch in scope. Activating a pending
    /// membership counts as an approval and needs a member-approving role.
    pub async fn update_membership(
        &self,
        actor: &UserIdentity,
        membership_id: MembershipId,
        patch: MembershipPatch,
    ) -> AppResult<Membership> {
        let leadership = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize(actor, &leadership)
            .await?;

        let mut membership = self.find_membership_by_id(membership_id).await?;
        let approves = membership.status == MembershipStatus::Pending
            && patch.status == Some(MembershipStatus::Active);
        let requirement = if approves {
            self.authorization_service
                .capability(RoleCapability::ApproveMembers)
        } else {
            leadership
        };
        self.authorization_service
            .authorize_in_branch(actor, &requirement, membership.branch_id)
            .await?;

        if patch == MembershipPatch::default() {
            return Ok(membership);
        }

        let now = Utc::now();
        if let Some(status) = patch.status {
            membership.transition(status, actor.user_id(), now);
        }
        match patch.card_issued {
            Some(true) if !membership.card_issued => membership.issue_card(now)?,
            Some(false) => membership.withdraw_card(now),
            _ => {}
        }

        let membership = self.membership_repository.save_membership(membership).await?;
        self.append_event(
            actor,
            if approves {
                AuditAction::MembershipApproved
            } else {
                AuditAction::MembershipUpdated
            },
            "membership",
            membership.membership_id.to_string(),
            format!(
                "membership set to '{}' (card issued: {})",
                membership.status.as_str(),
                membership.card_issued
            ),
        )
        .await?;
        info!(
            actor = %actor.user_id(),
            %membership_id,
            status = membership.status.as_str(),
            "membership updated"
        );

        Ok(membership)
    }

    /// Adds a pending membership for a user.
    pub async fn add_member(
        &self,
        actor: &UserIdentity,
        branch_id: BranchId,
        user_id: UserId,
    ) -> AppResult<Membership> {
        let requirement = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize_in_branch(actor, &requirement, branch_id)
            .await?;

        let branch = self.find_branch(branch_id).await?;
        let membership = self
            .membership_repository
            .create_membership(Membership::pending(user_id, branch_id, Utc::now()))
            .await?;

        self.append_event(
            actor,
            AuditAction::MembershipAdded,
            "membership",
            membership.membership_id.to_string(),
            format!("added user '{user_id}' to branch '{}'", branch.name),
        )
        .await?;

        Ok(membership)
    }

    /// Approves a membership. Requires a member-approving role with the branch in scope.
    pub async fn approve_member(
        &self,
        actor: &UserIdentity,
        branch_id: BranchId,
        user_id: UserId,
    ) -> AppResult<Membership> {
        let requirement = self
            .authorization_service
            .capability(RoleCapability::ApproveMembers);
        self.authorization_service
            .authorize_in_branch(actor, &requirement, branch_id)
            .await?;

        let mut membership = self.find_membership(branch_id, user_id).await?;
        membership.approve(actor.user_id(), Utc::now());
        let membership = self.membership_repository.save_membership(membership).await?;

        self.append_event(
            actor,
            AuditAction::MembershipApproved,
            "membership",
            membership.membership_id.to_string(),
            format!("approved user '{user_id}' in branch '{branch_id}'"),
        )
        .await?;
        info!(actor = %actor.user_id(), %user_id, %branch_id, "membership approved");

        Ok(membership)
    }

    /// Records the issue of a membership card for an active member.
    pub async fn issue_membership_card(
        &self,
        actor: &UserIdentity,
        branch_id: BranchId,
        user_id: UserId,
    ) -> AppResult<Membership> {
        let requirement = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize_in_branch(actor, &requirement, branch_id)
            .await?;

        let mut membership = self.find_membership(branch_id, user_id).await?;
        membership.issue_card(Utc::now())?;
        let membership = self.membership_repository.save_membership(membership).await?;

        self.append_event(
            actor,
            AuditAction::MembershipCardIssued,
            "membership",
            membership.membership_id.to_string(),
            format!("issued card to user '{user_id}'"),
        )
        .await?;

        Ok(membership)
    }

    async fn find_membership_by_id(&self, membership_id: MembershipId) -> AppResult<Membership> {
        self.membership_repository
            .find_membership_by_id(membership_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("membership '{membership_id}' not found")))
    }

    async fn find_membership(&self, branch_id: BranchId, user_id: UserId) -> AppResult<Membership> {
        self.membership_repository
            .find_membership(user_id, branch_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "user '{user_id}' has no membership in branch '{branch_id}'"
                ))
            })
    }
}
