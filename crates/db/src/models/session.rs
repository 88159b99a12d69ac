//! Refresh-token sessions.

use arttrack_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One issued refresh token, identified by its SHA-256 digest.
#[derive(Debug, Clone, FromRow)]
pub struct UserSession {
    pub id: DbId,
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    /// Set once the token has been redeemed or the artist logged out.
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

pub struct CreateSession {
    pub user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
