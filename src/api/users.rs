//! User account endpoints.
//!
//! - POST `/` - Register a new user
//! - PUT `/` - Change the authenticated user's email and password

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use crate::auth::{Auth, AuthBackend};
use crate::db::{Database, User, is_unique_violation};
use crate::impl_has_auth_backend;

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
    pub auth: AuthBackend,
}

impl_has_auth_backend!(UsersState);

pub fn router(state: UsersState) -> Router {
    Router::new()
        .route("/", post(create_user).put(update_user))
        .with_state(state)
}

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() {
            return Err(ApiError::bad_request("Email cannot be empty"));
        }
        if self.password.is_empty() {
            return Err(ApiError::bad_request("Password cannot be empty"));
        }
        Ok(())
    }
}

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: String,
    pub updated_at: String,
    pub email: String,
    pub is_chirpy_red: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

async fn create_user(
    State(state): State<UsersState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    payload.validate()?;

    let hashed = state
        .auth
        .lifecycle
        .hash_password(&payload.password)
        .await?;

    let user = match state.db.users().create(&payload.email, &hashed).await {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn update_user(
    Auth(user_id): Auth,
    State(state): State<UsersState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    payload.validate()?;

    let hashed = state
        .auth
        .lifecycle
        .hash_password(&payload.password)
        .await?;

    let updated = match state
        .db
        .users()
        .update(user_id, &payload.email, &hashed)
        .await
    {
        Ok(updated) => updated,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to update user", e)),
    };

    let user = updated.ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}
