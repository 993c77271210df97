//! Authentication state traits and macro.

use super::api_key::ApiKey;
use super::lifecycle::TokenLifecycle;

/// Everything the auth extractors need, shared by all handler states.
#[derive(Clone)]
pub struct AuthBackend {
    pub lifecycle: TokenLifecycle,
    pub api_key: ApiKey,
}

/// Trait for state types that can authenticate requests.
pub trait HasAuthBackend {
    fn auth(&self) -> &AuthBackend;
}

/// Macro to implement `HasAuthBackend` for state structs with an
/// `auth: AuthBackend` field.
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub auth: AuthBackend,
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn auth(&self) -> &$crate::auth::AuthBackend {
                &self.auth
            }
        }
    };
}
