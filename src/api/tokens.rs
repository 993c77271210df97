//! Session endpoints.
//!
//! - POST `/login` - Exchange email and password for an access and refresh token
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - POST `/revoke` - Revoke a refresh token

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::users::UserResponse;
use crate::auth::{AuthBackend, BearerToken};

#[derive(Clone)]
pub struct TokensState {
    pub auth: AuthBackend,
}

pub fn router(state: TokensState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: UserResponse,
    token: String,
    refresh_token: String,
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

async fn login(
    State(state): State<TokensState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let grant = state
        .auth
        .lifecycle
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        user: grant.user.into(),
        token: grant.access_token,
        refresh_token: grant.refresh_token,
    }))
}

/// The refresh token is not rotated; the same one keeps working until it
/// expires or is revoked.
async fn refresh(
    State(state): State<TokensState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<Json<RefreshResponse>, ApiError> {
    let token = state.auth.lifecycle.refresh(&refresh_token).await?;
    Ok(Json(RefreshResponse { token }))
}

async fn revoke(
    State(state): State<TokensState>,
    BearerToken(refresh_token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.auth.lifecycle.revoke(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
