//! Authentication error taxonomy.
//!
//! Every failure is either a credential failure (the caller presented
//! something we will not accept) or an infrastructure failure (we could not
//! decide). Credential failures all produce the same client response; the
//! specific reason only reaches the logs.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio::task::JoinError;

use super::header::HeaderError;
use super::password::PasswordError;
use super::refresh::RefreshError;
use super::store::StoreError;
use crate::jwt::JwtError;

/// Why a credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFailure {
    MissingHeader,
    WrongScheme,
    BadPassword,
    InvalidSignature,
    ExpiredToken,
    MalformedToken,
    UnknownRefreshToken,
    ExpiredRefreshToken,
    RevokedRefreshToken,
    UnknownUser,
    BadApiKey,
}

impl CredentialFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialFailure::MissingHeader => "missing authorization header",
            CredentialFailure::WrongScheme => "wrong authorization scheme",
            CredentialFailure::BadPassword => "bad email or password",
            CredentialFailure::InvalidSignature => "invalid token signature",
            CredentialFailure::ExpiredToken => "expired access token",
            CredentialFailure::MalformedToken => "malformed access token",
            CredentialFailure::UnknownRefreshToken => "unknown refresh token",
            CredentialFailure::ExpiredRefreshToken => "expired refresh token",
            CredentialFailure::RevokedRefreshToken => "revoked refresh token",
            CredentialFailure::UnknownUser => "token owner no longer exists",
            CredentialFailure::BadApiKey => "api key mismatch",
        }
    }
}

/// Errors surfaced by the auth subsystem.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("credential refused: {}", .0.as_str())]
    Credential(CredentialFailure),

    #[error("token generation failed: {0}")]
    Generation(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("password hashing failed: {0}")]
    Hashing(bcrypt::BcryptError),

    #[error("auth storage failed: {0}")]
    Persistence(StoreError),

    #[error("blocking task failed: {0}")]
    Task(#[from] JoinError),
}

impl AuthError {
    /// The credential failure, if this is one.
    pub fn credential(&self) -> Option<CredentialFailure> {
        match self {
            AuthError::Credential(failure) => Some(*failure),
            _ => None,
        }
    }
}

impl From<CredentialFailure> for AuthError {
    fn from(failure: CredentialFailure) -> Self {
        AuthError::Credential(failure)
    }
}

impl From<HeaderError> for AuthError {
    fn from(err: HeaderError) -> Self {
        match err {
            HeaderError::Missing => CredentialFailure::MissingHeader.into(),
            HeaderError::WrongScheme => CredentialFailure::WrongScheme.into(),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Mismatch => CredentialFailure::BadPassword.into(),
            PasswordError::Hashing(e) => AuthError::Hashing(e),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::InvalidSignature => CredentialFailure::InvalidSignature.into(),
            JwtError::Expired => CredentialFailure::ExpiredToken.into(),
            JwtError::Malformed(_) => CredentialFailure::MalformedToken.into(),
            JwtError::Encoding(e) => AuthError::Signing(e.to_string()),
            JwtError::InvalidTtl => AuthError::Signing(err.to_string()),
        }
    }
}

impl From<RefreshError> for AuthError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::NotFound => CredentialFailure::UnknownRefreshToken.into(),
            RefreshError::Expired => CredentialFailure::ExpiredRefreshToken.into(),
            RefreshError::Revoked => CredentialFailure::RevokedRefreshToken.into(),
            RefreshError::Generation(msg) => AuthError::Generation(msg),
            RefreshError::InvalidTtl => AuthError::Generation(err.to_string()),
            RefreshError::Persistence(e) => AuthError::Persistence(e),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Persistence(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Credential(failure) => {
                tracing::debug!(reason = failure.as_str(), "Credential refused");
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
            other => {
                tracing::error!(error = %other, "Authentication backend failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
