//! Login, refresh and revoke flows.
//!
//! `TokenLifecycle` ties the password hasher, the access token codec and the
//! refresh token store to a user directory. It is the only entry point the
//! HTTP layer uses for authentication decisions.

use std::sync::Arc;

use chrono::TimeDelta;
use uuid::Uuid;

use super::errors::{AuthError, CredentialFailure};
use super::password::PasswordHasher;
use super::refresh::{REFRESH_TOKEN_TTL_DAYS, RefreshTokenStore};
use super::store::{TokenRepository, UserDirectory};
use crate::db::User;
use crate::jwt::{ACCESS_TOKEN_DURATION_SECS, JwtConfig};

/// Token lifetimes.
#[derive(Debug, Clone, Copy)]
pub struct TokenPolicy {
    pub access_ttl: TimeDelta,
    pub refresh_ttl: TimeDelta,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            access_ttl: TimeDelta::seconds(ACCESS_TOKEN_DURATION_SECS),
            refresh_ttl: TimeDelta::days(REFRESH_TOKEN_TTL_DAYS),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginGrant {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct TokenLifecycle {
    hasher: PasswordHasher,
    jwt: Arc<JwtConfig>,
    refresh: RefreshTokenStore,
    users: Arc<dyn UserDirectory>,
    policy: TokenPolicy,
}

impl TokenLifecycle {
    pub fn new(
        hasher: PasswordHasher,
        jwt: Arc<JwtConfig>,
        tokens: Arc<dyn TokenRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            hasher,
            jwt,
            refresh: RefreshTokenStore::new(tokens),
            users,
            policy: TokenPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    /// Check an email/password pair and issue both tokens.
    ///
    /// An unknown email still pays for one bcrypt verification and fails
    /// exactly like a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, AuthError> {
        let user = self.users.get_user_by_email(email).await?;
        let hash = user.as_ref().map(|u| u.hashed_password.clone());

        self.hasher
            .verify_blocking(password.to_string(), hash)
            .await?;

        let Some(user) = user else {
            return Err(CredentialFailure::BadPassword.into());
        };

        let access_token = self.jwt.issue(user.id, self.policy.access_ttl)?;
        let refresh_token = self.refresh.issue(user.id, self.policy.refresh_ttl).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginGrant {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a new access token from a refresh token. The refresh token itself
    /// stays valid; it is not rotated.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let record = self.refresh.lookup(refresh_token).await?;

        if self.users.get_user_by_id(record.user_id).await?.is_none() {
            return Err(CredentialFailure::UnknownUser.into());
        }

        Ok(self.jwt.issue(record.user_id, self.policy.access_ttl)?)
    }

    /// Revoke a refresh token. Idempotent for known tokens.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthError> {
        self.refresh.revoke(refresh_token).await?;
        Ok(())
    }

    /// Validate an access token and return its user id.
    pub fn authenticate(&self, access_token: &str) -> Result<Uuid, AuthError> {
        Ok(self.jwt.validate(access_token)?)
    }

    /// Hash a new password on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.hasher.hash_blocking(password.to_string()).await
    }
}
