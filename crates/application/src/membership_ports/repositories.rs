use async_trait::async_trait;

use chapterdesk_core::{AppResult, UserId};
use chapterdesk_domain::{BranchDefinition, BranchId, Membership, MembershipId};

use super::{BranchFilter, BranchMember, MemberFilter};
use crate::Page;

/// Repository port for branches.
#[async_trait]
pub trait BranchRepository: Send + Sync {
    /// Lists branches matching the filter, ordered by name.
    async fn list_branches(&self, filter: &BranchFilter) -> AppResult<Vec<BranchDefinition>>;

    /// Finds one branch by id.
    async fn find_branch(&self, branch_id: BranchId) -> AppResult<Option<BranchDefinition>>;

    /// Persists a new branch. Fails with `Conflict` when the name is taken in the chapter.
    async fn create_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition>;

    /// Replaces a stored branch.
    async fn save_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition>;
}

/// Repository port for branch memberships.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Lists one page of a branch's members, ordered by full name.
    async fn list_branch_members(
        &self,
        branch_id: BranchId,
        filter: &MemberFilter,
    ) -> AppResult<Page<BranchMember>>;

    /// Finds a membership by id.
    async fn find_membership_by_id(
        &self,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>>;

    /// Lists every membership of one user.
    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<Membership>>;

    /// Finds the membership of a user in a branch.
    async fn find_membership(
        &self,
        user_id: UserId,
        branch_id: BranchId,
    ) -> AppResult<Option<Membership>>;

    /// Persists a new membership. Fails with `Conflict` when one exists for the pair.
    async fn create_membership(&self, membership: Membership) -> AppResult<Membership>;

    /// Replaces a stored membership.
    async fn save_membership(&self, membership: Membership) -> AppResult<Membership>;

    /// Counts active memberships of one branch.
    async fn count_active_members(&self, branch_id: BranchId) -> AppResult<u64>;
}
