pub mod admin;
pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod metrics;

use admin::AdminState;
use api::create_api_router;
use auth::{ApiKey, AuthBackend, PasswordHasher, TokenLifecycle};
use axum::{Router, middleware};
use cli::Platform;
use db::Database;
use jwt::JwtConfig;
use metrics::{HitCounter, count_hits};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing access tokens
    pub jwt_secret: Vec<u8>,
    /// Shared key that the payment provider presents on webhooks
    pub api_key: String,
    /// Directory served under /app
    pub assets_dir: PathBuf,
    /// Deployment platform; admin reset only works on dev
    pub platform: Platform,
    /// bcrypt cost for new password hashes
    pub password_cost: u32,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));

    let lifecycle = TokenLifecycle::new(
        PasswordHasher::new(config.password_cost),
        jwt,
        Arc::new(config.db.tokens()),
        Arc::new(config.db.users()),
    );
    let auth = AuthBackend {
        lifecycle,
        api_key: ApiKey::new(config.api_key.clone()),
    };

    let hits = HitCounter::new();

    let admin_state = AdminState {
        db: config.db.clone(),
        hits: hits.clone(),
        platform: config.platform,
    };

    // Static files, each request counted
    let app_routes = Router::new()
        .nest_service("/app", ServeDir::new(&config.assets_dir))
        .layer(middleware::from_fn_with_state(hits, count_hits));

    Router::new()
        .nest("/api", create_api_router(config.db.clone(), auth))
        .nest("/admin", admin::router(admin_state))
        .merge(app_routes)
        .layer(TraceLayer::new_for_http())
}

/// Serve the application on `listener` until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app.into_make_service()).await
}
