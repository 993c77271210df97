//! Password and token authentication.
//!
//! Dual-token system: short-lived access tokens (1 hour, stateless JWTs) and
//! long-lived refresh tokens (60 days, opaque and database-tracked). Service
//! callers authenticate with a shared API key instead.

mod api_key;
mod errors;
mod extractors;
pub mod header;
mod lifecycle;
pub mod memory;
pub mod password;
pub mod refresh;
mod state;
pub mod store;

pub use api_key::ApiKey;
pub use errors::{AuthError, CredentialFailure};
pub use extractors::{Auth, BearerToken, ServiceAuth};
pub use header::HeaderError;
pub use lifecycle::{LoginGrant, TokenLifecycle, TokenPolicy};
pub use password::{PasswordError, PasswordHasher};
pub use refresh::{RefreshError, RefreshTokenStore};
pub use state::{AuthBackend, HasAuthBackend};
pub use store::{RefreshTokenRecord, StoreError, TokenRepository, UserDirectory};
