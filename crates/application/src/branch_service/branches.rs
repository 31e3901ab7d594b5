use chapterdesk_core::NonEmptyString;
use chapterdesk_domain::{BranchPatch, BranchStatus, DEFAULT_MIN_MEMBERS, RoleCapability};
use chrono::Utc;
use tracing::info;

use crate::{BranchFilter, CreateBranchInput};

use super::*;

impl BranchService {
    /// Lists active branches. Needs no authentication.
    pub async fn list_public_branches(&self) -> AppResult<Vec<BranchDefinition>> {
        self.branch_repository
            .list_branches(&BranchFilter {
                status: Some(BranchStatus::Active),
                ..BranchFilter::default()
            })
            .await
    }

    /// Lists branches for an approved member. Only active branches are
    /// listed unless the filter names another status.
    pub async fn list_branches(
        &self,
        actor: &UserIdentity,
        filter: BranchFilter,
    ) -> AppResult<Vec<BranchDefinition>> {
        self.authorization_service.resolve_actor(actor).await?;

        let filter = BranchFilter {
            status: filter.status.or(Some(BranchStatus::Active)),
            ..filter
        };
        self.branch_repository.list_branches(&filter).await
    }

    /// Returns one branch.
    pub async fn get_branch(
        &self,
        actor: &UserIdentity,
        branch_id: BranchId,
    ) -> AppResult<BranchDefinition> {
        self.authorization_service.resolve_actor(actor).await?;
        self.find_branch(branch_id).await
    }

    /// Lists the branches the actor holds a membership in.
    pub async fn list_my_branches(&self, actor: &UserIdentity) -> AppResult<Vec<BranchDefinition>> {
        let branch_ids = self
            .membership_repository
            .list_user_memberships(actor.user_id())
            .await?
            .into_iter()
            .map(|membership| membership.branch_id)
            .collect();

        self.branch_repository
            .list_branches(&BranchFilter {
                branch_ids: Some(branch_ids),
                ..BranchFilter::default()
            })
            .await
    }

    /// Creates a branch. Requires chapter leadership.
    pub async fn create_branch(
        &self,
        actor: &UserIdentity,
        input: CreateBranchInput,
    ) -> AppResult<BranchDefinition> {
        let requirement = self
            .authorization_service
            .capability(RoleCapability::ChapterLeadership);
        self.authorization_service
            .authorize(actor, &requirement)
            .await?;

        let min_members = input.min_members.unwrap_or(DEFAULT_MIN_MEMBERS);
        if min_members == 0 {
            return Err(AppError::Validation(
                "branch minimum members must be at least 1".to_owned(),
            ));
        }

        let now = Utc::now();
        let branch = self
            .branch_repository
            .create_branch(BranchDefinition {
                branch_id: BranchId::new(),
                chapter_id: input.chapter_id,
                name: NonEmptyString::new(input.name)?,
                location: NonEmptyString::new(input.location)?,
                description: input
                    .description
                    .map(|description| description.trim().to_owned())
                    .filter(|description| !description.is_empty()),
                min_members,
                status: BranchStatus::Active,
                created_by: Some(actor.user_id()),
                created_at: now,
                updated_at: now,
            })
            .await?;

        self.append_event(
            actor,
            AuditAction::BranchCreated,
            "branch",
            branch.branch_id.to_string(),
            format!("created branch '{}'", branch.name),
        )
        .await?;
        info!(actor = %actor.user_id(), branch_id = %branch.branch_id, "branch created");

        Ok(branch)
    }

    /// Updates a branch. Requires leadership with the branch in scope.
    pub async fn update_branch(
        &self,
        actor: &UserIdentity,
        branch_id: BranchId,
        patch: BranchPatch,
    ) -> AppResult<BranchDefinition> {
        let requirement = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize_in_branch(actor, &requirement, branch_id)
            .await?;

        let mut branch = self.find_branch(branch_id).await?;
        patch.apply_to(&mut branch, Utc::now())?;
        let branch = self.branch_repository.save_branch(branch).await?;

        self.append_event(
            actor,
            AuditAction::BranchUpdated,
            "branch",
            branch.branch_id.to_string(),
            format!("updated branch '{}'", branch.name),
        )
        .await?;

        Ok(branch)
    }

    /// Marks a branch inactive. Refused while it still has active members.
    pub async fn deactivate_branch(
        &self,
        actor: &UserIdentity,
        branch_id: BranchId,
    ) -> AppResult<BranchDefinition> {
        let requirement = self
            .authorization_service
            .capability(RoleCapability::ChapterLeadership);
        self.authorization_service
            .authorize(actor, &requirement)
            .await?;

        let mut branch = self.find_branch(branch_id).await?;
        let active_members = self
            .membership_repository
            .count_active_members(branch_id)
            .await?;
        if active_members > 0 {
            return Err(AppError::Validation(format!(
                "branch '{}' still has {active_members} active members",
                branch.name
            )));
        }

        branch.status = BranchStatus::Inactive;
        branch.updated_at = Utc::now();
        let branch = self.branch_repository.save_branch(branch).await?;

        self.append_event(
            actor,
            AuditAction::BranchDeactivated,
            "branch",
            branch.branch_id.to_string(),
            format!("deactivated branch '{}'", branch.name),
        )
        .await?;
        info!(actor = %actor.user_id(), %branch_id, "branch deactivated");

        Ok(branch)
    }
}
