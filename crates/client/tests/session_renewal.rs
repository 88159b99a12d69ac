//! Access token renewal against a stand-in server.
//!
//! The server accepts only the refresh token `good-refresh` and only the
//! access token `fresh`, so every request starts out unauthorized.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arttrack_client::{ApiClient, HttpCommissionStore, HttpIdentityProvider};
use arttrack_core::error::{AuthError, StoreError};
use arttrack_core::identity::{Identity, IdentityProvider};
use arttrack_core::local_store::{FileStorage, KeyValueStorage, SESSION_KEY};
use arttrack_core::status::CommissionStatus;
use arttrack_core::store::CommissionStore;
use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Default)]
struct Counters {
    refreshes: AtomicUsize,
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": message, "code": "UNAUTHORIZED" })),
    )
        .into_response()
}

async fn refresh(State(counters): State<Arc<Counters>>, Json(body): Json<Value>) -> Response {
    counters.refreshes.fetch_add(1, Ordering::SeqCst);
    match body["refresh_token"].as_str() {
        Some("good-refresh") => Json(json!({
            "access_token": "fresh",
            "refresh_token": "rotated",
            "expires_in": 900,
            "user": { "userId": "1", "displayName": "兔兔老師" },
        }))
        .into_response(),
        Some("down") => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Database unavailable", "code": "INTERNAL_ERROR" })),
        )
            .into_response(),
        _ => unauthorized("Invalid or expired refresh token"),
    }
}

async fn set_status(headers: HeaderMap) -> Response {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer fresh") => StatusCode::NO_CONTENT.into_response(),
        _ => unauthorized("Invalid or expired token"),
    }
}

async fn spawn_server(counters: Arc<Counters>) -> String {
    let app = Router::new()
        .route("/api/v1/auth/refresh", post(refresh))
        .route("/api/v1/commissions/{id}/status", patch(set_status))
        .with_state(counters);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
}

struct Fixture {
    counters: Arc<Counters>,
    provider: Arc<HttpIdentityProvider>,
    store: HttpCommissionStore,
    storage: FileStorage,
    _dir: tempfile::TempDir,
}

/// A client whose access token has expired, holding `refresh_token`.
async fn expired_session(refresh_token: &str) -> Fixture {
    let counters = Arc::new(Counters::default());
    let url = spawn_server(Arc::clone(&counters)).await;

    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path());
    storage
        .set(SESSION_KEY, &json!({ "refreshToken": refresh_token }).to_string())
        .unwrap();

    let api = Arc::new(ApiClient::new(url));
    api.set_access_token(Some("stale".to_string())).await;
    let provider = Arc::new(HttpIdentityProvider::new(
        Arc::clone(&api),
        Box::new(storage.clone()),
    ));
    let store = HttpCommissionStore::new(api).with_session(Arc::clone(&provider));

    Fixture {
        counters,
        provider,
        store,
        storage,
        _dir: dir,
    }
}

fn bunny() -> Identity {
    Identity {
        user_id: "1".to_string(),
        display_name: "兔兔老師".to_string(),
    }
}

#[tokio::test]
async fn expired_access_token_is_renewed_and_request_retried() {
    let fx = expired_session("good-refresh").await;

    fx.store
        .set_status("c-101", CommissionStatus::Sketch)
        .await
        .unwrap();

    assert_eq!(fx.counters.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(fx.provider.current_identity(), Some(bunny()));
    let persisted = fx.storage.get(SESSION_KEY).unwrap().unwrap();
    assert!(persisted.contains("rotated"));
}

#[tokio::test]
async fn concurrent_expiries_share_one_renewal() {
    let fx = expired_session("good-refresh").await;

    let (a, b) = tokio::join!(
        fx.store.set_status("c-101", CommissionStatus::Sketch),
        fx.store.set_status("c-103", CommissionStatus::Color),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(fx.counters.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(fx.provider.current_identity(), Some(bunny()));
}

#[tokio::test]
async fn rejected_renewal_signs_out_and_fails_the_request() {
    let fx = expired_session("revoked").await;
    let mut rx = fx.provider.subscribe();

    let err = fx
        .store
        .set_status("c-101", CommissionStatus::Sketch)
        .await
        .unwrap_err();

    assert_matches!(err, StoreError::Transport(_));
    assert_eq!(fx.counters.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(fx.storage.get(SESSION_KEY).unwrap(), None);
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), None);
}

#[tokio::test]
async fn server_error_on_restore_keeps_session() {
    let fx = expired_session("down").await;

    let err = fx.provider.restore().await.unwrap_err();

    assert_matches!(err, AuthError::Other(_));
    assert_eq!(fx.provider.current_identity(), None);
    let persisted = fx.storage.get(SESSION_KEY).unwrap().unwrap();
    assert!(persisted.contains("down"));
}

#[tokio::test]
async fn rejected_restore_discards_session() {
    let fx = expired_session("revoked").await;

    assert!(fx.provider.restore().await.is_err());
    assert_eq!(fx.storage.get(SESSION_KEY).unwrap(), None);
}
