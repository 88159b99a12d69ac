//! HTTP-level tests for the `/auth` endpoints against a real database.
//!
//! Run with `DATABASE_URL` set and `--include-ignored`.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, post_json, send};
use serde_json::json;
use sqlx::PgPool;

async fn signup(pool: &PgPool, email: &str, name: &str) -> serde_json::Value {
    let body = json!({ "email": email, "password": "secret123", "display_name": name });
    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn signup_returns_tokens_and_identity(pool: PgPool) {
    let json = signup(&pool, "bunny@example.com", " 兔兔老師 ").await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["displayName"], "兔兔老師");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_email_is_rejected(pool: PgPool) {
    signup(&pool, "bunny@example.com", "兔兔老師").await;

    let body = json!({ "email": "BUNNY@example.com", "password": "secret123", "display_name": "X" });
    let response = post_json(common::build_test_app(pool), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "DUPLICATE_ACCOUNT");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_display_name_is_rejected(pool: PgPool) {
    signup(&pool, "bunny@example.com", "兔兔老師").await;

    // Same name up to case and surrounding whitespace would share ownership scope.
    for name in ["兔兔老師", "  兔兔老師 "] {
        let body = json!({ "email": "other@example.com", "password": "secret123", "display_name": name });
        let response = post_json(common::build_test_app(pool.clone()), "/api/v1/auth/signup", body).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_json(response).await["code"], "DUPLICATE_ACCOUNT");
    }

    let body = json!({ "email": "artist@example.com", "password": "secret123", "display_name": "Bunny" });
    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json!({ "email": "artist2@example.com", "password": "secret123", "display_name": "BUNNY" });
    let response = post_json(common::build_test_app(pool), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn login_and_me(pool: PgPool) {
    signup(&pool, "bear@example.com", "熊熊繪圖").await;

    let body = json!({ "email": "bear@example.com", "password": "secret123" });
    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let auth = format!("Bearer {token}");
    let response = send(
        common::build_test_app(pool),
        Method::GET,
        "/api/v1/auth/me",
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["displayName"], "熊熊繪圖");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn wrong_password_and_lockout_look_the_same(pool: PgPool) {
    signup(&pool, "bunny@example.com", "兔兔老師").await;

    for _ in 0..5 {
        let body = json!({ "email": "bunny@example.com", "password": "wrong-pass" });
        let response = post_json(common::build_test_app(pool.clone()), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIAL");
    }

    // Locked now: even the right password is refused.
    let body = json!({ "email": "bunny@example.com", "password": "secret123" });
    let response = post_json(common::build_test_app(pool), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIAL");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn refresh_rotates_the_token(pool: PgPool) {
    let json = signup(&pool, "bunny@example.com", "兔兔老師").await;
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let body = json!({ "refresh_token": refresh });
    let response = post_json(common::build_test_app(pool.clone()), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The old token is single use.
    let response = post_json(common::build_test_app(pool), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    let json = signup(&pool, "bunny@example.com", "兔兔老師").await;
    let access = format!("Bearer {}", json["access_token"].as_str().unwrap());
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = send(
        common::build_test_app(pool.clone()),
        Method::POST,
        "/api/v1/auth/logout",
        Some(&access),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
