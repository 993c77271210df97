//! Session (access) token issuing and validation.
//!
//! Access tokens are HS256 JWTs that carry only the issuer, issue time,
//! expiry and the user id as subject. They are stateless: nothing is stored
//! server side, so revoking a refresh token never affects them.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer written into every token and required on validation.
pub const TOKEN_ISSUER: &str = "chirpy";

/// Access token lifetime: 1 hour
pub const ACCESS_TOKEN_DURATION_SECS: i64 = 60 * 60;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Subject (user UUID)
    pub sub: String,
}

/// Signing configuration for access tokens.
///
/// The secret is only ever turned into keys here; it never ends up inside a
/// token.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Sign an access token for `user_id` that expires `ttl` from now.
    ///
    /// A negative `ttl` yields a token that is already expired.
    pub fn issue(&self, user_id: Uuid, ttl: TimeDelta) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl).ok_or(JwtError::InvalidTtl)?;

        let claims = SessionClaims {
            iss: TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            sub: user_id.to_string(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)
    }

    /// Validate an access token and return the user id it was issued for.
    ///
    /// The signature is checked before any claim is looked at, so a forged
    /// token is always reported as `InvalidSignature` regardless of its
    /// expiry or subject.
    pub fn validate(&self, token: &str) -> Result<Uuid, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let token_data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)?;

        // jsonwebtoken still accepts exp == now
        if Utc::now().timestamp() >= token_data.claims.exp {
            return Err(JwtError::Expired);
        }

        Uuid::parse_str(&token_data.claims.sub)
            .map_err(|_| JwtError::Malformed("subject is not a user id".to_string()))
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("failed to encode token: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("token lifetime is out of range")]
    InvalidTtl,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => JwtError::InvalidSignature,
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Malformed(err.to_string()),
        }
    }
}
