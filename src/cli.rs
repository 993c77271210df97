//! CLI argument parsing, validation, and startup helpers.

use std::path::PathBuf;

use crate::ServerConfig;
use crate::auth::password::DEFAULT_COST;
use crate::db::Database;
use clap::Parser;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

const JWT_SECRET_VAR: &str = "JWT_SECRET";
const API_KEY_VAR: &str = "POLKA_KEY";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment platform. Destructive admin endpoints only work on `Dev`.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Platform {
    Dev,
    #[default]
    Prod,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Chirpy", about = "Short posts with token authentication")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DB_URL", default_value = "chirpy.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Path to file containing the Polka API key. Prefer using POLKA_KEY env var instead
    #[arg(long)]
    pub api_key_file: Option<String>,

    /// Directory served under /app
    #[arg(long, env = "ASSETS_DIR", default_value = ".")]
    pub assets_dir: PathBuf,

    /// Deployment platform
    #[arg(long, env = "PLATFORM", value_enum, default_value = "prod")]
    pub platform: Platform,

    /// Log output format
    #[arg(short, long, env = "LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Read a secret from `var`, falling back to `file`. The variable is removed
/// from the environment once read.
fn load_secret(var: &str, file: Option<&str>, flag: &str) -> Option<String> {
    if let Ok(secret) = std::env::var(var) {
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(var) };
        return Some(secret);
    }

    let Some(path) = file else {
        error!(
            "{} is required. Set the {} environment variable (recommended) or use {}",
            var, var, flag
        );
        return None;
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Some(content.trim().to_string()),
        Err(e) => {
            error!(path = %path, error = %e, "Failed to read secret file");
            None
        }
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = load_secret(JWT_SECRET_VAR, jwt_secret_file, "--jwt-secret-file")?;

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Load the Polka API key from environment variable or file.
pub fn load_api_key(api_key_file: Option<&str>) -> Option<String> {
    let key = load_secret(API_KEY_VAR, api_key_file, "--api-key-file")?;

    if key.is_empty() {
        error!("Polka API key is empty");
        return None;
    }

    Some(key)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    api_key: String,
    assets_dir: PathBuf,
    platform: Platform,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        api_key,
        assets_dir,
        platform,
        password_cost: DEFAULT_COST,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Serializes tests that read or mutate process environment variables.
    /// `set_var`/`remove_var` are not thread-safe; concurrent access is UB.
    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn secret_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_args_defaults() {
        let _guard = env_lock();
        let args = Args::try_parse_from(["chirpy"]).unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.database, "chirpy.db");
        assert_eq!(args.platform, Platform::Prod);
        assert_eq!(args.assets_dir, PathBuf::from("."));
    }

    #[test]
    fn test_args_platform_dev() {
        let _guard = env_lock();
        let args = Args::try_parse_from(["chirpy", "--platform", "dev", "-p", "0"]).unwrap();
        assert_eq!(args.platform, Platform::Dev);
        assert_eq!(args.port, 0);
    }

    #[test]
    fn test_args_reject_unknown_platform() {
        let _guard = env_lock();
        assert!(Args::try_parse_from(["chirpy", "--platform", "staging"]).is_err());
    }

    #[test]
    fn test_secret_from_env_is_removed() {
        let _guard = env_lock();
        let var = "CHIRPY_TEST_SECRET_FROM_ENV";
        // SAFETY: serialized by ENV_MUTEX, no other test touches the environment concurrently.
        unsafe { std::env::set_var(var, "from-env") };

        assert_eq!(load_secret(var, None, "--x").as_deref(), Some("from-env"));
        assert!(std::env::var(var).is_err());
    }

    #[test]
    fn test_secret_from_file_is_trimmed() {
        let _guard = env_lock();
        let file = secret_file("  from-file\n");
        let path = file.path().to_str().unwrap();

        assert_eq!(
            load_secret("CHIRPY_TEST_SECRET_UNSET", Some(path), "--x").as_deref(),
            Some("from-file")
        );
    }

    #[test]
    fn test_secret_missing_everywhere() {
        let _guard = env_lock();
        assert!(load_secret("CHIRPY_TEST_SECRET_MISSING", None, "--x").is_none());
        assert!(
            load_secret(
                "CHIRPY_TEST_SECRET_MISSING",
                Some("/nonexistent/chirpy/secret"),
                "--x"
            )
            .is_none()
        );
    }

    #[tokio::test]
    async fn test_build_config_uses_default_cost() {
        let db = Database::open(":memory:").await.unwrap();

        let config = build_config(
            db,
            "x".repeat(32),
            "key".to_string(),
            PathBuf::from("."),
            Platform::Dev,
        );
        assert_eq!(config.password_cost, DEFAULT_COST);
        assert_eq!(config.jwt_secret.len(), 32);
    }
}
