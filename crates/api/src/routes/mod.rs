pub mod auth;
pub mod commissions;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                  create account (public)
/// /auth/login                   login (public)
/// /auth/refresh                 refresh (public)
/// /auth/logout                  logout (requires auth)
/// /auth/me                      current identity (requires auth)
///
/// /commissions                  list (?artist_id), create (requires auth)
/// /commissions/{id}             delete (owner only)
/// /commissions/{id}/status      set status (owner only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes.
        .nest("/auth", auth::router())
        // Commission collection.
        .nest("/commissions", commissions::router())
}
