//! `GET /health`, mounted at the root rather than under `/api/v1`.

use arttrack_db::repositories::CommissionRepo;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"ok"`, or `"degraded"` when the commission table cannot be read.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Stored commissions; absent when the database did not answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commissions: Option<i64>,
    pub public_read: bool,
    pub registration_open: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let commissions = match CommissionRepo::count(&state.pool).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not count commissions");
            None
        }
    };

    Json(HealthResponse {
        status: if commissions.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy: commissions.is_some(),
        commissions,
        public_read: state.config.public_read,
        registration_open: state.config.allow_registration,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
