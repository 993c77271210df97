//! Password hashing with bcrypt.
//!
//! Hashes are self-describing (`$2b$<cost>$<salt><digest>`), so verification
//! never needs the cost that was in effect when the hash was created.

use super::errors::AuthError;

/// Work factor for newly created password hashes.
pub const DEFAULT_COST: u32 = 12;

/// Password hashing errors.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password does not match")]
    Mismatch,

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
}

/// One-way password hasher with a fixed bcrypt cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// The digest comparison inside bcrypt is constant time. An unreadable
    /// stored hash is treated as a mismatch.
    pub fn verify(&self, plaintext: &str, hash: &str) -> Result<(), PasswordError> {
        match bcrypt::verify(plaintext, hash) {
            Ok(true) => Ok(()),
            Ok(false) => Err(PasswordError::Mismatch),
            Err(_) => {
                tracing::warn!("Stored password hash could not be parsed");
                Err(PasswordError::Mismatch)
            }
        }
    }

    /// Spend the same time as a real verification without any account to
    /// check against, so unknown emails cannot be told apart by latency.
    pub fn verify_nothing(&self, plaintext: &str) -> PasswordError {
        let _ = bcrypt::verify(plaintext, &self.placeholder_hash());
        PasswordError::Mismatch
    }

    /// `hash` on the blocking thread pool.
    pub async fn hash_blocking(self, plaintext: String) -> Result<String, AuthError> {
        let hash = tokio::task::spawn_blocking(move || self.hash(&plaintext)).await??;
        Ok(hash)
    }

    /// `verify` on the blocking thread pool. `None` runs `verify_nothing`.
    pub async fn verify_blocking(
        self,
        plaintext: String,
        hash: Option<String>,
    ) -> Result<(), AuthError> {
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => self.verify(&plaintext, &hash),
            None => Err(self.verify_nothing(&plaintext)),
        })
        .await??;
        Ok(())
    }

    // All-zero salt and digest: parses fine and matches no password.
    fn placeholder_hash(&self) -> String {
        format!("$2b${:02}${}", self.cost, ".".repeat(53))
    }
}
