use async_trait::async_trait;

use chapterdesk_application::{
    BranchFilter, BranchMember, BranchRepository, MemberFilter, MembershipRepository, Page,
};
use chapterdesk_core::{AppError, AppResult, UserId};
use chapterdesk_domain::{BranchDefinition, BranchId, Membership, MembershipId};

use super::{InMemoryStore, StoreState};

impl StoreState {
    fn branch_name_taken(&self, branch: &BranchDefinition) -> bool {
        self.branches.values().any(|stored| {
            stored.branch_id != branch.branch_id
                && stored.chapter_id == branch.chapter_id
                && stored.name == branch.name
        })
    }
}

#[async_trait]
impl BranchRepository for InMemoryStore {
    async fn list_branches(&self, filter: &BranchFilter) -> AppResult<Vec<BranchDefinition>> {
        let state = self.state.read().await;

        let mut branches: Vec<BranchDefinition> = state
            .branches
            .values()
            .filter(|branch| filter.chapter_id.is_none_or(|id| branch.chapter_id == id))
            .filter(|branch| filter.status.is_none_or(|status| branch.status == status))
            .filter(|branch| {
                filter
                    .branch_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&branch.branch_id))
            })
            .cloned()
            .collect();
        branches.sort_by(|left, right| left.name.cmp(&right.name));

        Ok(branches)
    }

    async fn find_branch(&self, branch_id: BranchId) -> AppResult<Option<BranchDefinition>> {
        Ok(self.state.read().await.branches.get(&branch_id).cloned())
    }

    async fn create_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition> {
        let mut state = self.state.write().await;

        if state.branch_name_taken(&branch) || state.branches.contains_key(&branch.branch_id) {
            return Err(AppError::Conflict(format!(
                "branch '{}' already exists in this chapter",
                branch.name
            )));
        }

        state.branches.insert(branch.branch_id, branch.clone());
        Ok(branch)
    }

    async fn save_branch(&self, branch: BranchDefinition) -> AppResult<BranchDefinition> {
        let mut state = self.state.write().await;

        if !state.branches.contains_key(&branch.branch_id) {
            return Err(AppError::NotFound(format!(
                "branch '{}' was not found",
                branch.branch_id
            )));
        }
        if state.branch_name_taken(&branch) {
            return Err(AppError::Conflict(format!(
                "branch '{}' already exists in this chapter",
                branch.name
            )));
        }

        state.branches.insert(branch.branch_id, branch.clone());
        Ok(branch)
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn list_branch_members(
        &self,
        branch_id: BranchId,
        filter: &MemberFilter,
    ) -> AppResult<Page<BranchMember>> {
        let state = self.state.read().await;

        let mut members: Vec<BranchMember> = state
            .memberships
            .values()
            .filter(|membership| membership.branch_id == branch_id)
            .filter(|membership| filter.status.is_none_or(|status| membership.status == status))
            .filter_map(|membership| {
                state.users.get(&membership.user_id).map(|user| BranchMember {
                    membership: membership.clone(),
                    full_name: user.account.full_name.to_string(),
                    email: user.account.email.as_str().to_owned(),
                    membership_number: user.account.membership_number.clone(),
                })
            })
            .collect();
        members.sort_by(|left, right| {
            left.full_name
                .cmp(&right.full_name)
                .then_with(|| left.membership.membership_id.cmp(&right.membership.membership_id))
        });

        Ok(filter.page.slice(members))
    }

    async fn find_membership_by_id(
        &self,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>> {
        Ok(self.state.read().await.memberships.get(&membership_id).cloned())
    }

    async fn list_user_memberships(&self, user_id: UserId) -> AppResult<Vec<Membership>> {
        let state = self.state.read().await;

        let mut memberships: Vec<Membership> = state
            .memberships
            .values()
            .filter(|membership| membership.user_id == user_id)
            .cloned()
            .collect();
        memberships.sort_by_key(|membership| membership.created_at);

        Ok(memberships)
    }

    async fn find_membership(
        &self,
        user_id: UserId,
        branch_id: BranchId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .state
            .read()
            .await
            .memberships
            .values()
            .find(|membership| membership.user_id == user_id && membership.branch_id == branch_id)
            .cloned())
    }

    async fn create_membership(&self, membership: Membership) -> AppResult<Membership> {
        let mut state = self.state.write().await;

        let exists = state.memberships.values().any(|stored| {
            stored.user_id == membership.user_id && stored.branch_id == membership.branch_id
        });
        if exists {
            return Err(AppError::Conflict(format!(
                "user '{}' already has a membership of branch '{}'",
                membership.user_id, membership.branch_id
            )));
        }

        state
            .memberships
            .insert(membership.membership_id, membership.clone());
        Ok(membership)
    }

    async fn save_membership(&self, membership: Membership) -> AppResult<Membership> {
        let mut state = self.state.write().await;

        let Some(stored) = state.memberships.get_mut(&membership.membership_id) else {
            return Err(AppError::NotFound(format!(
                "membership '{}' was not found",
                membership.membership_id
            )));
        };

        *stored = membership.clone();
        Ok(membership)
    }

    async fn count_active_members(&self, branch_id: BranchId) -> AppResult<u64> {
        let state = self.state.read().await;

        let count = state
            .memberships
            .values()
            .filter(|membership| membership.branch_id == branch_id && membership.is_active())
            .count();

        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
