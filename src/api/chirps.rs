//! Chirp endpoints.
//!
//! - POST `/` - Create a chirp (authenticated)
//! - GET `/` - List chirps, optionally by author and sort order
//! - GET `/{id}` - Get one chirp
//! - DELETE `/{id}` - Delete one of your own chirps

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ApiError, ResultExt, parse_uuid};
use crate::auth::{Auth, AuthBackend};
use crate::db::{Chirp, Database};
use crate::impl_has_auth_backend;

/// Maximum chirp length in characters.
pub const MAX_CHIRP_LENGTH: usize = 140;

const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const CENSORED: &str = "****";

#[derive(Clone)]
pub struct ChirpsState {
    pub db: Database,
    pub auth: AuthBackend,
}

impl_has_auth_backend!(ChirpsState);

pub fn router(state: ChirpsState) -> Router {
    Router::new()
        .route("/", get(list_chirps).post(create_chirp))
        .route("/{id}", get(get_chirp).delete(delete_chirp))
        .with_state(state)
}

/// Replace profane words (case-insensitive, whole words only) and collapse
/// whitespace runs to single spaces.
pub fn clean_body(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            if PROFANE_WORDS.contains(&lower.as_str()) {
                CENSORED
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Deserialize)]
struct CreateChirpRequest {
    body: String,
}

#[derive(Deserialize)]
struct ListParams {
    author_id: Option<String>,
    sort: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChirpResponse {
    id: Uuid,
    created_at: String,
    updated_at: String,
    body: String,
    user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

async fn create_chirp(
    Auth(user_id): Auth,
    State(state): State<ChirpsState>,
    Json(payload): Json<CreateChirpRequest>,
) -> Result<(StatusCode, Json<ChirpResponse>), ApiError> {
    if payload.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::bad_request("Chirp is too long"));
    }

    let chirp = state
        .db
        .chirps()
        .create(user_id, &clean_body(&payload.body))
        .await
        .db_err("Failed to create chirp")?;

    Ok((StatusCode::CREATED, Json(chirp.into())))
}

async fn list_chirps(
    State(state): State<ChirpsState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ChirpResponse>>, ApiError> {
    let author = params
        .author_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| parse_uuid(id, "Author"))
        .transpose()?;

    let mut chirps = state
        .db
        .chirps()
        .list(author)
        .await
        .db_err("Failed to list chirps")?;

    if params.sort.as_deref() == Some("desc") {
        chirps.reverse();
    }

    Ok(Json(chirps.into_iter().map(Into::into).collect()))
}

async fn get_chirp(
    State(state): State<ChirpsState>,
    Path(id): Path<String>,
) -> Result<Json<ChirpResponse>, ApiError> {
    let id = parse_uuid(&id, "Chirp")?;

    let chirp = state
        .db
        .chirps()
        .get(id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    Ok(Json(chirp.into()))
}

async fn delete_chirp(
    Auth(user_id): Auth,
    State(state): State<ChirpsState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_uuid(&id, "Chirp")?;

    let chirp = state
        .db
        .chirps()
        .get(id)
        .await
        .db_err("Failed to get chirp")?
        .ok_or_else(|| ApiError::not_found("Chirp not found"))?;

    if chirp.user_id != user_id {
        return Err(ApiError::forbidden("Not the author of this chirp"));
    }

    state
        .db
        .chirps()
        .delete(id)
        .await
        .db_err("Failed to delete chirp")?;

    Ok(StatusCode::NO_CONTENT)
}
