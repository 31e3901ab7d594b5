use async_trait::async_trait;
use chrono::Utc;

use chapterdesk_application::{
    AuditEvent, AuditRepository, NewUserRecord, Page, RegisteredUser, SessionTokenRecord,
    SessionTokenRepository, UserFilter, UserProfilePatch, UserRecord, UserRepository,
};
use chapterdesk_core::{AppError, AppResult, UserId};
use chapterdesk_domain::{EmailAddress, Membership, UserAccount, UserStatus};

use super::InMemoryStore;

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserRecord>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|user| &user.account.email == email)
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.state.read().await.users.get(&user_id).cloned())
    }

    async fn next_membership_sequence(&self, year: i32) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let sequence = state.membership_sequences.entry(year).or_insert(0);
        *sequence += 1;

        Ok(*sequence)
    }

    async fn create_user(&self, user: NewUserRecord) -> AppResult<RegisteredUser> {
        let mut state = self.state.write().await;

        if state
            .users
            .values()
            .any(|stored| stored.account.email == user.email)
        {
            return Err(AppError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let now = Utc::now();
        let account = UserAccount {
            user_id: UserId::new(),
            email: user.email,
            full_name: user.full_name,
            status: user.status,
            membership_number: user.membership_number,
            created_at: now,
            updated_at: now,
        };
        let membership = user
            .initial_branch
            .map(|branch_id| Membership::pending(account.user_id, branch_id, now));
        if let Some(membership) = &membership {
            state
                .memberships
                .insert(membership.membership_id, membership.clone());
        }
        state.users.insert(
            account.user_id,
            UserRecord {
                account: account.clone(),
                password_hash: user.password_hash,
            },
        );

        Ok(RegisteredUser {
            account,
            membership,
        })
    }

    async fn list_users(&self, filter: &UserFilter) -> AppResult<Page<UserAccount>> {
        let state = self.state.read().await;
        let search = filter.search.as_deref().map(str::to_lowercase);

        let mut users: Vec<UserAccount> = state
            .users
            .values()
            .map(|user| &user.account)
            .filter(|account| filter.status.is_none_or(|status| account.status == status))
            .filter(|account| {
                filter.branch_ids.as_ref().is_none_or(|branch_ids| {
                    state.memberships.values().any(|membership| {
                        membership.user_id == account.user_id
                            && branch_ids.contains(&membership.branch_id)
                    })
                })
            })
            .filter(|account| {
                search.as_deref().is_none_or(|search| {
                    account.full_name.as_str().to_lowercase().contains(search)
                        || account.membership_number.to_lowercase().contains(search)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|left, right| {
            left.full_name
                .cmp(&right.full_name)
                .then_with(|| left.user_id.cmp(&right.user_id))
        });

        Ok(filter.page.slice(users))
    }

    async fn update_profile(
        &self,
        user_id: UserId,
        patch: &UserProfilePatch,
    ) -> AppResult<Option<UserAccount>> {
        let mut state = self.state.write().await;

        Ok(state.users.get_mut(&user_id).map(|user| {
            if let Some(full_name) = &patch.full_name {
                user.account.full_name = full_name.clone();
            }
            user.account.updated_at = Utc::now();
            user.account.clone()
        }))
    }

    async fn update_status(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<Option<UserAccount>> {
        let mut state = self.state.write().await;

        Ok(state.users.get_mut(&user_id).map(|user| {
            user.account.status = status;
            user.account.updated_at = Utc::now();
            user.account.clone()
        }))
    }
}

#[async_trait]
impl SessionTokenRepository for InMemoryStore {
    async fn store_token(&self, record: SessionTokenRecord) -> AppResult<()> {
        self.state
            .write()
            .await
            .session_tokens
            .insert(record.token_hash.clone(), record);

        Ok(())
    }

    async fn find_token(&self, token_hash: &str) -> AppResult<Option<SessionTokenRecord>> {
        Ok(self
            .state
            .read()
            .await
            .session_tokens
            .get(token_hash)
            .cloned())
    }

    async fn delete_token(&self, token_hash: &str) -> AppResult<()> {
        self.state.write().await.session_tokens.remove(token_hash);

        Ok(())
    }
}

#[async_trait]
impl AuditRepository for InMemoryStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);

        Ok(())
    }
}
