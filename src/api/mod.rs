mod chirps;
mod error;
mod tokens;
mod users;
mod webhooks;

use axum::{Router, http::header, response::IntoResponse, routing::get};

use crate::auth::AuthBackend;
use crate::db::Database;

pub use chirps::{MAX_CHIRP_LENGTH, clean_body};
pub use error::ApiError;
pub use users::UserResponse;

/// Create the API router.
pub fn create_api_router(db: Database, auth: AuthBackend) -> Router {
    let users_state = users::UsersState {
        db: db.clone(),
        auth: auth.clone(),
    };

    let chirps_state = chirps::ChirpsState {
        db: db.clone(),
        auth: auth.clone(),
    };

    let webhooks_state = webhooks::WebhooksState {
        db,
        auth: auth.clone(),
    };

    let tokens_state = tokens::TokensState { auth };

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/users", users::router(users_state))
        .nest("/chirps", chirps::router(chirps_state))
        .nest("/polka", webhooks::router(webhooks_state))
        .merge(tokens::router(tokens_state))
}

async fn healthz() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "OK")
}
