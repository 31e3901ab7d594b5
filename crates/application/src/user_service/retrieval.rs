use chapterdesk_core::{AppError, UserIdentity};
use chapterdesk_domain::AuditAction;

use crate::AuditEvent;

use super::*;

impl UserService {
    /// Resolves the caller behind a bearer token.
    pub async fn authenticate(&self, token: &str) -> AppResult<UserIdentity> {
        let unauthorized = || AppError::Unauthorized("invalid or expired token".to_owned());

        let subject = self
            .token_service
            .verify(token)
            .await?
            .ok_or_else(unauthorized)?;
        let record = self
            .stores
            .users
            .find_by_id(subject)
            .await?
            .ok_or_else(unauthorized)?;

        let account = record.account;
        Ok(UserIdentity::new(
            account.user_id,
            account.full_name.as_str(),
            Some(account.email.as_str().to_owned()),
            account.is_approved(),
        ))
    }

    /// Returns the caller's account.
    pub async fn current_user(&self, actor: &UserIdentity) -> AppResult<UserAccount> {
        self.find_account(actor.user_id()).await
    }
}

impl UserService {
    /// Returns one user's account. Requires chapter or branch leadership.
    pub async fn get_user(&self, actor: &UserIdentity, user_id: UserId) -> AppResult<UserAccount> {
        let requirement = self.authorization_service.any_leadership();
        self.authorization_service
            .authorize(actor, &requirement)
            .await?;

        self.find_account(user_id).await
    }

    /// Lists users for leadership.
    ///
    /// Branch-scoped leaders only see members of their branches; a requested
    /// branch outside their scope is refused.
    pub async fn list_users(
        &self,
        actor: &UserIdentity,
        params: UserListParams,
    ) -> AppResult<Page<UserAccount>> {
        let requirement = self.authorization_service.any_leadership();
        let access = self
            .authorization_service
            .authorize(actor, &requirement)
            .await?;

        let branch_ids = match (params.branch_id, access.scope.branch_ids()) {
            (Some(branch_id), _) if !access.scope.permits(branch_id) => {
                return Err(AppError::Forbidden(format!(
                    "subject '{}' has no access to branch '{branch_id}'",
                    actor.user_id()
                )));
            }
            (Some(branch_id), _) => Some(BTreeSet::from([branch_id])),
            (None, scoped) => scoped.cloned(),
        };

        self.stores
            .users
            .list_users(&UserFilter {
                status: params.status,
                branch_ids,
                search: params
                    .search
                    .map(|search| search.trim().to_owned())
                    .filter(|search| !search.is_empty()),
                page: params.page,
            })
            .await
    }

    /// Updates the caller's own profile.
    pub async fn update_my_profile(
        &self,
        actor: &UserIdentity,
        patch: UserProfilePatch,
    ) -> AppResult<UserAccount> {
        if patch.is_empty() {
            return Err(AppError::Validation(
                "no profile fields provided for update".to_owned(),
            ));
        }

        let account = self
            .stores
            .users
            .update_profile(actor.user_id(), &patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", actor.user_id())))?;

        self.stores
            .audit
            .append_event(AuditEvent {
                subject: actor.user_id(),
                action: AuditAction::UserProfileUpdated,
                resource_type: "user".to_owned(),
                resource_id: account.user_id.to_string(),
                detail: None,
            })
            .await?;

        Ok(account)
    }

    async fn find_account(&self, user_id: UserId) -> AppResult<UserAccount> {
        self.stores
            .users
            .find_by_id(user_id)
            .await?
            .map(|record| record.account)
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' not found")))
    }
}
