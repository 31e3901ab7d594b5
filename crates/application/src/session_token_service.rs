//! Opaque bearer tokens for API sessions.
//!
//! Tokens are 32 random bytes, hex encoded. Only their SHA-256 hash is stored,
//! next to the subject and an expiry.

mod token_crypto;


use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use chapterdesk_core::{AppResult, UserId};

use token_crypto::{generate_token, hash_token};

/// Default session lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Token handed to a client after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Raw bearer token. Never persisted.
    pub token: String,
    /// Subject the token authenticates.
    pub subject: UserId,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Port for issuing and verifying bearer tokens.
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issues a new token for the subject.
    async fn issue(&self, subject: UserId) -> AppResult<IssuedToken>;

    /// Returns the subject of a valid, unexpired token.
    async fn verify(&self, token: &str) -> AppResult<Option<UserId>>;

    /// Invalidates a token. Unknown tokens are ignored.
    async fn revoke(&self, token: &str) -> AppResult<()>;
}

/// Stored session token row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokenRecord {
    /// SHA-256 hash of the raw token, hex encoded.
    pub token_hash: String,
    /// Authenticated subject.
    pub subject: UserId,
    /// Expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Repository port for session token persistence.
#[async_trait]
pub trait SessionTokenRepository: Send + Sync {
    /// Stores a token record.
    async fn store_token(&self, record: SessionTokenRecord) -> AppResult<()>;

    /// Finds a token record by hash.
    async fn find_token(&self, token_hash: &str) -> AppResult<Option<SessionTokenRecord>>;

    /// Deletes a token record by hash.
    async fn delete_token(&self, token_hash: &str) -> AppResult<()>;
}

/// Token service backed by hashed session rows.
#[derive(Clone)]
pub struct SessionTokenService {
    repository: Arc<dyn SessionTokenRepository>,
    ttl: Duration,
}

impl SessionTokenService {
    /// Creates a token service issuing tokens valid for `ttl_minutes`.
    #[must_use]
    pub fn new(repository: Arc<dyn SessionTokenRepository>, ttl_minutes: i64) -> Self {
        Self {
            repository,
            ttl: Duration::minutes(ttl_minutes.max(1)),
        }
    }
}

#[async_trait]
impl TokenService for SessionTokenService {
    async fn issue(&self, subject: UserId) -> AppResult<IssuedToken> {
        let (token, token_hash) = generate_token()?;
        let expires_at = Utc::now() + self.ttl;

        self.repository
            .store_token(SessionTokenRecord {
                token_hash,
                subject,
                expires_at,
            })
            .await?;

        Ok(IssuedToken {
            token,
            subject,
            expires_at,
        })
    }

    async fn verify(&self, token: &str) -> AppResult<Option<UserId>> {
        let token_hash = hash_token(token);
        let Some(record) = self.repository.find_token(&token_hash).await? else {
            return Ok(None);
        };

        if record.expires_at <= Utc::now() {
            self.repository.delete_token(&token_hash).await?;
            return Ok(None);
        }

        Ok(Some(record.subject))
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        self.repository.delete_token(&hash_token(token)).await
    }
}
