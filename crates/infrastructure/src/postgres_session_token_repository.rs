use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use chapterdesk_application::{SessionTokenRecord, SessionTokenRepository};
use chapterdesk_core::{AppResult, UserId};

use crate::postgres_rows::internal;

/// PostgreSQL-backed store of hashed session tokens.
#[derive(Clone)]
pub struct PostgresSessionTokenRepository {
    pool: PgPool,
}

impl PostgresSessionTokenRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SessionTokenRow {
    token_hash: String,
    subject: uuid::Uuid,
    expires_at: DateTime<Utc>,
}

#[async_trait]
impl SessionTokenRepository for PostgresSessionTokenRepository {
    async fn store_token(&self, record: SessionTokenRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO session_tokens (token_hash, subject, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(record.token_hash.as_str())
        .bind(record.subject.as_uuid())
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(internal("store session token"))?;

        Ok(())
    }

    async fn find_token(&self, token_hash: &str) -> AppResult<Option<SessionTokenRecord>> {
        Ok(sqlx::query_as::<_, SessionTokenRow>(
            r#"
            SELECT token_hash, subject, expires_at
            FROM session_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find session token"))?
        .map(|row| SessionTokenRecord {
            token_hash: row.token_hash,
            subject: UserId::from_uuid(row.subject),
            expires_at: row.expires_at,
        }))
    }

    async fn delete_token(&self, token_hash: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM session_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await
            .map_err(internal("delete session token"))?;

        Ok(())
    }
}
