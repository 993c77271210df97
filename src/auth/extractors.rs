//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::errors::{AuthError, CredentialFailure};
use super::header;
use super::state::HasAuthBackend;

/// Extractor for endpoints that require a valid access token.
/// Yields the authenticated user's id.
pub struct Auth(pub Uuid);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = header::bearer_token(&parts.headers)?;
        state.auth().lifecycle.authenticate(token).map(Auth)
    }
}

/// Raw bearer token, unvalidated. Used by the refresh and revoke endpoints,
/// where the bearer value is a refresh token rather than a JWT.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = header::bearer_token(&parts.headers)?;
        Ok(BearerToken(token.to_string()))
    }
}

/// Extractor for service endpoints authenticated with the shared API key.
pub struct ServiceAuth;

impl<S> FromRequestParts<S> for ServiceAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = header::api_key(&parts.headers)?;
        if !state.auth().api_key.matches(key) {
            tracing::warn!("Rejected request with wrong API key");
            return Err(CredentialFailure::BadApiKey.into());
        }
        Ok(ServiceAuth)
    }
}
