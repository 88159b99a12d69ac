//! Identity collaborator contract.
//!
//! Authentication itself happens elsewhere; the core only needs to know
//! whether someone is signed in, under which display name, and with which
//! stable account key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::AuthError;

/// Maximum length of a public display name.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 50;

/// The currently authenticated artist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable account key; survives display name changes.
    pub user_id: String,
    /// Public display name, stamped as `artistId` on created commissions.
    pub display_name: String,
}

/// The external sign-in service.
///
/// `current_identity` must reflect asynchronous changes (a restored session,
/// an expired refresh token); [`IdentityProvider::subscribe`] lets callers
/// observe them.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<Identity, AuthError>;

    /// Create an account whose public display name is set atomically with it.
    async fn sign_up(
        &self,
        email: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    fn current_identity(&self) -> Option<Identity>;

    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
}

/// Reject empty sign-in fields before contacting the provider.
pub fn validate_sign_in(email: &str, secret: &str) -> Result<(), AuthError> {
    if email.trim().is_empty() {
        return Err(AuthError::Validation("請輸入 Email。".to_string()));
    }
    if secret.is_empty() {
        return Err(AuthError::Validation("請輸入密碼。".to_string()));
    }
    Ok(())
}

/// Reject incomplete registrations before contacting the provider.
///
/// Returns the display name trimmed.
pub fn validate_registration<'a>(
    email: &str,
    secret: &str,
    display_name: &'a str,
) -> Result<&'a str, AuthError> {
    validate_sign_in(email, secret)?;
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(AuthError::Validation("請輸入繪師名稱。".to_string()));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(AuthError::Validation(format!(
            "繪師名稱不能超過 {MAX_DISPLAY_NAME_LENGTH} 個字。"
        )));
    }
    Ok(display_name)
}
