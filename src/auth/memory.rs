//! In-memory persistence collaborators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use super::store::{RefreshTokenRecord, StoreError, TokenRepository, UserDirectory};
use crate::db::User;

/// Refresh tokens keyed by token value.
#[derive(Debug, Default)]
pub struct MemoryTokenRepository {
    tokens: DashMap<String, RefreshTokenRecord>,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn create_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), StoreError> {
        self.tokens.insert(record.token.clone(), record);
        Ok(())
    }

    async fn get_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.tokens.get(token).map(|entry| entry.value().clone()))
    }

    async fn mark_refresh_token_revoked(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        // get_mut holds the shard lock, so readers never see a half update.
        if let Some(mut entry) = self.tokens.get_mut(token) {
            entry.revoked_at.get_or_insert(at);
        }
        Ok(())
    }
}

/// Users indexed by id, with a secondary email index.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, user: User) {
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
    }

    pub fn remove(&self, id: Uuid) -> Option<User> {
        let (_, user) = self.users.remove(&id)?;
        self.emails.remove(&user.email);
        Some(user)
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let Some(id) = self.emails.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.get_user_by_id(id).await
    }
}
