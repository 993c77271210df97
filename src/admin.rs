//! Admin endpoints.
//!
//! - GET `/metrics` - HTML page with the file server hit count
//! - POST `/reset` - Zero the hit count and delete all users (dev only)

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};

use crate::api::ApiError;
use crate::cli::Platform;
use crate::db::Database;
use crate::metrics::HitCounter;

#[derive(Clone)]
pub struct AdminState {
    pub db: Database,
    pub hits: HitCounter,
    pub platform: Platform,
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/reset", post(reset))
        .with_state(state)
}

fn render_metrics(hits: u64) -> String {
    format!(
        "<html>\n  <body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {} times!</p>\n  </body>\n</html>",
        hits
    )
}

async fn metrics(State(state): State<AdminState>) -> Html<String> {
    Html(render_metrics(state.hits.get()))
}

async fn reset(State(state): State<AdminState>) -> Result<StatusCode, ApiError> {
    if state.platform != Platform::Dev {
        return Err(ApiError::forbidden("Reset is only allowed in dev"));
    }

    state.hits.reset();
    let deleted = state
        .db
        .users()
        .delete_all()
        .await
        .map_err(|e| ApiError::db_error("Failed to delete users", e))?;

    tracing::warn!(deleted, "Reset hit counter and deleted all users");
    Ok(StatusCode::OK)
}
