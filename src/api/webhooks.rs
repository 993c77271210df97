//! Payment provider webhooks.
//!
//! - POST `/webhooks` - Polka events, authenticated with the shared API key

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;

use super::error::{ApiError, ResultExt};
use crate::auth::{AuthBackend, ServiceAuth};
use crate::db::Database;
use crate::impl_has_auth_backend;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Clone)]
pub struct WebhooksState {
    pub db: Database,
    pub auth: AuthBackend,
}

impl_has_auth_backend!(WebhooksState);

pub fn router(state: WebhooksState) -> Router {
    Router::new()
        .route("/webhooks", post(polka_webhook))
        .with_state(state)
}

#[derive(Deserialize)]
struct WebhookRequest {
    #[serde(default)]
    event: String,
    #[serde(default)]
    data: WebhookData,
}

#[derive(Deserialize, Default)]
struct WebhookData {
    #[serde(default)]
    user_id: String,
}

async fn polka_webhook(
    _service: ServiceAuth,
    State(state): State<WebhooksState>,
    payload: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let user_id = uuid::Uuid::parse_str(&payload.data.user_id)
        .map_err(|_| ApiError::bad_request("Invalid user id"))?;

    if payload.event != USER_UPGRADED {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let upgraded = state
        .db
        .users()
        .upgrade_to_chirpy_red(user_id)
        .await
        .db_err("Failed to upgrade user")?;

    if !upgraded {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %user_id, "User upgraded to Chirpy Red");
    Ok(StatusCode::NO_CONTENT)
}
