use chapterdesk_core::AppError;
use chapterdesk_domain::EmailAddress;
use tracing::warn;

use crate::IssuedToken;

use super::*;

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid email or password".to_owned())
}

impl UserService {
    /// Authenticates with email and password and issues a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedToken> {
        let record = match EmailAddress::new(email) {
            Ok(email) => self.stores.users.find_by_email(&email).await?,
            Err(_) => None,
        };

        let Some(record) = record else {
            let _ = self.password_hasher.hash_password(password);
            warn!("login attempt for unknown email");
            return Err(invalid_credentials());
        };

        if !self
            .password_hasher
            .verify_password(password, &record.password_hash)?
        {
            warn!(user_id = %record.account.user_id, "login attempt with invalid password");
            return Err(invalid_credentials());
        }

        self.token_service.issue(record.account.user_id).await
    }

    /// Invalidates a bearer token.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        self.token_service.revoke(token).await
    }
}
