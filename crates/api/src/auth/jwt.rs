//! Artist session tokens.
//!
//! An access token is a short-lived HS256 JWT naming the account and the
//! display name its commissions are filed under. A refresh token is an
//! opaque single-use string; the server keeps only its SHA-256 digest.

use arttrack_core::types::{DbId, Timestamp};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::env_or;

/// `iss` of every token this server signs; anything else is rejected.
pub const ISSUER: &str = "arttrack";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: DbId,
    /// Display name, used as the owner key of the artist's commissions.
    pub name: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_ttl_mins: i64,
    pub refresh_ttl_days: i64,
}

impl JwtConfig {
    /// | Env Var                   | Default  |
    /// |---------------------------|----------|
    /// | `JWT_SECRET`              | required |
    /// | `JWT_ACCESS_EXPIRY_MINS`  | `15`     |
    /// | `JWT_REFRESH_EXPIRY_DAYS` | `7`      |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or a lifetime is not an
    /// integer.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        assert!(!secret.is_empty(), "JWT_SECRET must be set");
        Self {
            secret,
            access_ttl_mins: env_or("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_ttl_days: env_or("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Access token lifetime, as reported to clients in `expires_in`.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_mins * 60
    }

    /// When a refresh token issued at `issued` stops being accepted.
    pub fn refresh_expiry(&self, issued: Timestamp) -> Timestamp {
        issued + chrono::Duration::days(self.refresh_ttl_days)
    }

    pub fn issue_access_token(
        &self,
        user_id: DbId,
        display_name: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            name: display_name.to_string(),
            iss: ISSUER.to_string(),
            exp: now + self.access_ttl_secs(),
            iat: now,
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check signature, issuer and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }
}

/// A freshly minted refresh token and the digest to store for it.
pub struct RefreshToken {
    pub plaintext: String,
    pub digest: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let plaintext = Uuid::new_v4().to_string();
        let digest = refresh_token_digest(&plaintext);
        Self { plaintext, digest }
    }
}

/// SHA-256 hex digest under which a refresh token is looked up.
pub fn refresh_token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
