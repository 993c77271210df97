//! Credential extraction from the `Authorization` header.
//!
//! Two schemes exist and they are never interchangeable: `Bearer` carries a
//! user's access or refresh token, `ApiKey` carries the shared service key.
//! An endpoint asks for exactly one of them.

use axum::http::{HeaderMap, header::AUTHORIZATION};

/// Prefix for user tokens.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Prefix for the service API key.
pub const API_KEY_PREFIX: &str = "ApiKey ";

/// Why a credential could not be pulled out of a header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("authorization header is missing")]
    Missing,

    #[error("authorization header uses another scheme")]
    WrongScheme,
}

/// Extract a bearer token from a raw header value.
///
/// The prefix is case-sensitive and the remainder is returned as is.
pub fn extract_bearer(header_value: &str) -> Result<&str, HeaderError> {
    strip_scheme(header_value, BEARER_PREFIX)
}

/// Extract an API key from a raw header value.
pub fn extract_api_key(header_value: &str) -> Result<&str, HeaderError> {
    strip_scheme(header_value, API_KEY_PREFIX)
}

/// Bearer token from the request's `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, HeaderError> {
    extract_bearer(authorization(headers)?)
}

/// API key from the request's `Authorization` header.
pub fn api_key(headers: &HeaderMap) -> Result<&str, HeaderError> {
    extract_api_key(authorization(headers)?)
}

/// First `Authorization` value. An absent header reads as empty; a value
/// that is not visible ASCII cannot carry either scheme.
fn authorization(headers: &HeaderMap) -> Result<&str, HeaderError> {
    match headers.get(AUTHORIZATION) {
        None => Ok(""),
        Some(value) => value.to_str().map_err(|_| HeaderError::WrongScheme),
    }
}

fn strip_scheme<'a>(header_value: &'a str, prefix: &str) -> Result<&'a str, HeaderError> {
    if header_value.is_empty() {
        return Err(HeaderError::Missing);
    }
    header_value
        .strip_prefix(prefix)
        .ok_or(HeaderError::WrongScheme)
}
