use chapterdesk_core::{AppError, UserIdentity};
use chapterdesk_domain::{AuditAction, MembershipStatus, actions};
use chrono::Utc;
use tracing::info;

use crate::{AccessRequirement, AuditEvent};

use super::*;

impl UserService {
    /// Changes a user's approval status.
    ///
    /// Approving a user also activates their pending branch memberships.
    pub async fn update_user_status(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<UserAccount> {
        self.authorization_service
            .authorize(
                actor,
                &AccessRequirement::permission("members", [actions::APPROVE]),
            )
            .await?;

        let account = self
            .stores
            .users
            .update_status(user_id, status)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))?;

        if status == UserStatus::Approved {
            let now = Utc::now();
            for mut membership in self
                .stores
                .memberships
                .list_user_memberships(user_id)
                .await?
                .into_iter()
                .filter(|membership| membership.status == MembershipStatus::Pending)
            {
                membership.approve(actor.user_id(), now);
                self.stores.memberships.save_membership(membership).await?;
            }
        }

        self.stores
            .audit
            .append_event(AuditEvent {
                subject: actor.user_id(),
                action: AuditAction::UserStatusChanged,
                resource_type: "user".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!("status set to '{}'", status.as_str())),
            })
            .await?;

        info!(actor = %actor.user_id(), %user_id, status = status.as_str(), "user status changed");

        Ok(account)
    }
}
