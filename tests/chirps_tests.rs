//! Tests for creating, listing and deleting chirps.

mod common;

use axum::http::StatusCode;
use common::{Session, bearer, create_test_app, register_and_login, request, send};
use serde_json::{Value, json};
use uuid::Uuid;

async fn post_chirp(app: &axum::Router, session: &Session, body: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            "POST",
            "/api/chirps",
            Some(&bearer(&session.token)),
            Some(json!({ "body": body })),
        ),
    )
    .await
}

fn bodies(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_create_chirp() {
    let t = create_test_app().await;
    let session = register_and_login(&t.app, "a@b.c", "pw").await;

    let (status, body) = post_chirp(&t.app, &session, "Hello, world!").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["body"], "Hello, world!");
    assert_eq!(body["user_id"], session.user_id.as_str());
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_create_chirp_requires_auth() {
    let t = create_test_app().await;

    let (status, _) = send(
        &t.app,
        request("POST", "/api/chirps", None, Some(json!({ "body": "hi" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chirp_length_limit_counts_characters() {
    let t = create_test_app().await;
    let session = register_and_login(&t.app, "a@b.c", "pw").await;

    let (status, _) = post_chirp(&t.app, &session, &"é".repeat(140)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_chirp(&t.app, &session, &"a".repeat(141)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Chirp is too long");
}

#[tokio::test]
async fn test_profanity_is_censored() {
    let t = create_test_app().await;
    let session = register_and_login(&t.app, "a@b.c", "pw").await;

    let (_, body) = post_chirp(
        &t.app,
        &session,
        "I hear Mastodon is better than Chirpy. sharbert I need to migrate",
    )
    .await;
    assert_eq!(
        body["body"],
        "I hear Mastodon is better than Chirpy. **** I need to migrate"
    );

    let (_, body) = post_chirp(&t.app, &session, "Kerfuffle! is fine but Fornax is not").await;
    assert_eq!(body["body"], "Kerfuffle! is fine but **** is not");
}

#[tokio::test]
async fn test_list_sorting_and_author_filter() {
    let t = create_test_app().await;
    let alice = register_and_login(&t.app, "alice@b.c", "pw").await;
    let bob = register_and_login(&t.app, "bob@b.c", "pw").await;

    post_chirp(&t.app, &alice, "first").await;
    post_chirp(&t.app, &bob, "second").await;
    post_chirp(&t.app, &alice, "third").await;

    let (status, list) = send(&t.app, request("GET", "/api/chirps", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bodies(&list), ["first", "second", "third"]);

    let (_, list) = send(&t.app, request("GET", "/api/chirps?sort=asc", None, None)).await;
    assert_eq!(bodies(&list), ["first", "second", "third"]);

    let (_, list) = send(&t.app, request("GET", "/api/chirps?sort=desc", None, None)).await;
    assert_eq!(bodies(&list), ["third", "second", "first"]);

    let uri = format!("/api/chirps?author_id={}", alice.user_id);
    let (_, list) = send(&t.app, request("GET", &uri, None, None)).await;
    assert_eq!(bodies(&list), ["first", "third"]);

    let uri = format!("/api/chirps?author_id={}&sort=desc", bob.user_id);
    let (_, list) = send(&t.app, request("GET", &uri, None, None)).await;
    assert_eq!(bodies(&list), ["second"]);
}

#[tokio::test]
async fn test_list_with_malformed_author() {
    let t = create_test_app().await;

    let (status, _) = send(
        &t.app,
        request("GET", "/api/chirps?author_id=not-a-uuid", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_with_empty_author_returns_all() {
    let t = create_test_app().await;
    let alice = register_and_login(&t.app, "alice@b.c", "pw").await;
    let bob = register_and_login(&t.app, "bob@b.c", "pw").await;
    post_chirp(&t.app, &alice, "first").await;
    post_chirp(&t.app, &bob, "second").await;

    let (status, list) = send(&t.app, request("GET", "/api/chirps?author_id=", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bodies(&list), ["first", "second"]);
}

#[tokio::test]
async fn test_get_chirp() {
    let t = create_test_app().await;
    let session = register_and_login(&t.app, "a@b.c", "pw").await;
    let (_, created) = post_chirp(&t.app, &session, "findable").await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(
        &t.app,
        request("GET", &format!("/api/chirps/{}", id), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    for missing in [Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let (status, _) = send(
            &t.app,
            request("GET", &format!("/api/chirps/{}", missing), None, None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_delete_chirp() {
    let t = create_test_app().await;
    let owner = register_and_login(&t.app, "owner@b.c", "pw").await;
    let other = register_and_login(&t.app, "other@b.c", "pw").await;
    let (_, created) = post_chirp(&t.app, &owner, "mine").await;
    let uri = format!("/api/chirps/{}", created["id"].as_str().unwrap());

    let (status, _) = send(&t.app, request("DELETE", &uri, None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &t.app,
        request("DELETE", &uri, Some(&bearer(&other.token)), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &t.app,
        request("DELETE", &uri, Some(&bearer(&owner.token)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&t.app, request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &t.app,
        request("DELETE", &uri, Some(&bearer(&owner.token)), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
