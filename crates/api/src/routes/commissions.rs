//! Route definitions for the `/commissions` resource.

use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::commissions;
use crate::state::AppState;

/// Routes mounted at `/commissions`.
///
/// ```text
/// GET    /              -> list (?artist_id)
/// POST   /              -> create (requires auth)
/// PATCH  /{id}/status   -> set_status (owner only)
/// DELETE /{id}          -> delete (owner only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(commissions::list).post(commissions::create))
        .route("/{id}/status", patch(commissions::set_status))
        .route("/{id}", delete(commissions::delete))
}
