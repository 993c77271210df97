//! Refresh token storage.
//!
//! Only refresh tokens are stored in the database. Access tokens are
//! stateless and short-lived (1 hour). Times are stored as unix seconds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::auth::{RefreshTokenRecord, StoreError, TokenRepository};

/// Store for refresh token records.
#[derive(Clone)]
pub struct TokenStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    token: String,
    user_id: String,
    issued_at: i64,
    expires_at: i64,
    revoked_at: Option<i64>,
}

impl TryFrom<TokenRow> for RefreshTokenRecord {
    type Error = sqlx::Error;

    fn try_from(row: TokenRow) -> Result<Self, Self::Error> {
        Ok(Self {
            token: row.token,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            issued_at: from_timestamp(row.issued_at)?,
            expires_at: from_timestamp(row.expires_at)?,
            revoked_at: row.revoked_at.map(from_timestamp).transpose()?,
        })
    }
}

fn from_timestamp(secs: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| sqlx::Error::Decode(format!("timestamp out of range: {}", secs).into()))
}

impl TokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, record: &RefreshTokenRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, issued_at, expires_at, revoked_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&record.token)
        .bind(record.user_id.to_string())
        .bind(record.issued_at.timestamp())
        .bind(record.expires_at.timestamp())
        .bind(record.revoked_at.map(|t| t.timestamp()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch a token record regardless of revocation or expiry.
    pub async fn get(&self, token: &str) -> Result<Option<RefreshTokenRecord>, sqlx::Error> {
        let row: Option<TokenRow> = sqlx::query_as(
            "SELECT token, user_id, issued_at, expires_at, revoked_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(RefreshTokenRecord::try_from).transpose()
    }

    /// Set `revoked_at` unless the token is already revoked. Returns true if
    /// this call did the revoking.
    pub async fn revoke(&self, token: &str, at: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
             WHERE token = ? AND revoked_at IS NULL",
        )
        .bind(at.timestamp())
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn create_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        Ok(self.create(&record).await?)
    }

    async fn get_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.get(token).await?)
    }

    async fn mark_refresh_token_revoked(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.revoke(token, at).await?;
        Ok(())
    }
}
