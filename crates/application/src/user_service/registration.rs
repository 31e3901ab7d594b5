use chapterdesk_core::AppError;
use chapterdesk_domain::{
    AuditAction, EmailAddress, UserStatus, format_membership_number, validate_password,
};
use chrono::{Datelike, Utc};
use tracing::info;

use crate::{AuditEvent, RegisteredUser};

use super::*;

impl UserService {
    /// Registers a user applying to join a branch.
    ///
    /// The account starts as `pending_approval` with a pending membership of the
    /// chosen branch, which must be active. Account and membership are stored
    /// in one write, so a failed registration can simply be retried.
    pub async fn register(&self, params: RegisterParams) -> AppResult<UserAccount> {
        let email = EmailAddress::new(params.email)?;
        validate_password(&params.password)?;
        let full_name = NonEmptyString::new(params.full_name)?;

        let branch = self.stores.branches.find_branch(params.branch_id).await?;
        let Some(branch) = branch.filter(|branch| branch.is_active()) else {
            return Err(AppError::Validation(format!(
                "branch '{}' is not available or not active",
                params.branch_id
            )));
        };

        if self.stores.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let password_hash = self.password_hasher.hash_password(&params.password)?;
        let year = Utc::now().year();
        let sequence = self.stores.users.next_membership_sequence(year).await?;

        let RegisteredUser {
            account,
            membership,
        } = self
            .stores
            .users
            .create_user(NewUserRecord {
                email,
                full_name,
                password_hash,
                status: UserStatus::PendingApproval,
                membership_number: format_membership_number(year, sequence),
                initial_branch: Some(branch.branch_id),
            })
            .await?;
        let membership = membership.ok_or_else(|| {
            AppError::Internal(format!(
                "registration of '{}' stored no membership",
                account.user_id
            ))
        })?;

        self.stores
            .audit
            .append_event(AuditEvent {
                subject: account.user_id,
                action: AuditAction::MembershipAdded,
                resource_type: "membership".to_owned(),
                resource_id: membership.membership_id.to_string(),
                detail: Some(format!(
                    "registered '{}' for branch '{}'",
                    account.membership_number, branch.name
                )),
            })
            .await?;

        info!(
            user_id = %account.user_id,
            branch_id = %branch.branch_id,
            membership_number = %account.membership_number,
            "user registered"
        );

        Ok(account)
    }
}
