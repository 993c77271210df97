//! Persistence collaborators consumed by the auth core.
//!
//! The auth code never talks to sqlite directly; it goes through these two
//! traits so it can run against the database (`crate::db`) or the in-memory
//! implementations in `super::memory`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::User;

/// A persisted refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Errors from a persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for refresh token records.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn create_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError>;

    /// Fetch a record regardless of its revoked or expired state.
    async fn get_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Set `revoked_at` if it is not already set. Revoking twice keeps the
    /// first timestamp.
    async fn mark_refresh_token_revoked(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Read access to user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
