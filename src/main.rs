use chirpy::cli::{
    Args, build_config, init_logging, load_api_key, load_jwt_secret, open_database,
};
use chirpy::run_server;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // .env values behave like real environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(api_key) = load_api_key(args.api_key_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap_or_else(|e| {
        error!(error = %e, "Failed to read local address");
        std::process::exit(1);
    });

    let config = build_config(db, jwt_secret, api_key, args.assets_dir, args.platform);

    info!(address = %local_addr, platform = ?config.platform, "Listening");

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
