//! Opaque, revocable refresh tokens.
//!
//! A refresh token is 32 random bytes, hex encoded, with all of its state
//! (owner, expiry, revocation) held by a `TokenRepository`. Expiry is
//! evaluated lazily on lookup; nothing sweeps old rows.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use rand::TryRngCore;
use rand::rngs::OsRng;
use uuid::Uuid;

use super::store::{RefreshTokenRecord, StoreError, TokenRepository};

/// Refresh token lifetime: 60 days
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

const TOKEN_BYTES: usize = 32;

/// Refresh token errors.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh token not found")]
    NotFound,

    #[error("refresh token has expired")]
    Expired,

    #[error("refresh token has been revoked")]
    Revoked,

    #[error("random source unavailable: {0}")]
    Generation(String),

    #[error("refresh token storage failed: {0}")]
    Persistence(#[from] StoreError),

    #[error("token lifetime is out of range")]
    InvalidTtl,
}

/// Generate a fresh 64-character hex token from the OS random source.
pub fn generate_refresh_token() -> Result<String, RefreshError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| RefreshError::Generation(e.to_string()))?;
    Ok(hex::encode(bytes))
}

/// Issues, looks up and revokes refresh tokens.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repo: Arc<dyn TokenRepository>,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn TokenRepository>) -> Self {
        Self { repo }
    }

    /// Create and persist a token for `user_id`. A negative `ttl` produces a
    /// token that is already expired.
    pub async fn issue(&self, user_id: Uuid, ttl: TimeDelta) -> Result<String, RefreshError> {
        let token = generate_refresh_token()?;
        let now = Utc::now();
        let expires_at = now.checked_add_signed(ttl).ok_or(RefreshError::InvalidTtl)?;

        self.repo
            .create_refresh_token(RefreshTokenRecord {
                token: token.clone(),
                user_id,
                issued_at: now,
                expires_at,
                revoked_at: None,
            })
            .await?;

        Ok(token)
    }

    /// Return the record for a usable token.
    ///
    /// Checks run in order: missing, revoked, expired.
    pub async fn lookup(&self, token: &str) -> Result<RefreshTokenRecord, RefreshError> {
        let record = self
            .repo
            .get_refresh_token(token)
            .await?
            .ok_or(RefreshError::NotFound)?;

        if record.is_revoked() {
            return Err(RefreshError::Revoked);
        }
        if record.is_expired_at(Utc::now()) {
            return Err(RefreshError::Expired);
        }
        Ok(record)
    }

    /// Revoke a token. Works on expired tokens, and is a no-op on tokens that
    /// are already revoked.
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshError> {
        let record = self
            .repo
            .get_refresh_token(token)
            .await?
            .ok_or(RefreshError::NotFound)?;

        if record.is_revoked() {
            return Ok(());
        }

        self.repo
            .mark_refresh_token_revoked(token, Utc::now())
            .await?;
        Ok(())
    }
}
