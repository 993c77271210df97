#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chirpy::{ServerConfig, cli::Platform, create_app, db::Database, jwt::JwtConfig};
use serde_json::Value;
use tower::ServiceExt;

pub const JWT_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";
pub const API_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: JwtConfig,
}

/// Dev platform, current directory as the asset root.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(Platform::Dev, PathBuf::from(".")).await
}

pub async fn create_test_app_with(platform: Platform, assets_dir: PathBuf) -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: JWT_SECRET.to_vec(),
        api_key: API_KEY.to_string(),
        assets_dir,
        platform,
        password_cost: 4,
    };
    TestApp {
        app: create_app(&config),
        db,
        jwt: JwtConfig::new(JWT_SECRET),
    }
}

/// Build a request with an optional `Authorization` value and JSON body.
pub fn request(method: &str, uri: &str, authorization: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and return the status and raw body.
pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

/// Send a request and parse the body as JSON (`Null` when empty).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send_raw(app, request).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    (status, json)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Register a user and return the response body.
pub async fn register(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/users",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    body
}

pub struct Session {
    pub user_id: String,
    pub token: String,
    pub refresh_token: String,
}

/// Log in and return the issued tokens.
pub async fn login(app: &Router, email: &str, password: &str) -> Session {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    Session {
        user_id: body["id"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
        refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
    }
}

/// Register and log in.
pub async fn register_and_login(app: &Router, email: &str, password: &str) -> Session {
    register(app, email, password).await;
    login(app, email, password).await
}
