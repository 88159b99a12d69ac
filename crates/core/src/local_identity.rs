//! Name-only identity for running without a backend.
//!
//! Whoever types an artist name becomes that artist; there is no secret and
//! nothing is persisted. The name doubles as the account key.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::identity::{Identity, IdentityProvider, MAX_DISPLAY_NAME_LENGTH};

pub struct LocalIdentityProvider {
    tx: watch::Sender<Option<Identity>>,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Become the artist called `name`. Observers see the change.
    pub fn sign_in_as(&self, name: &str) -> Result<Identity, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("請輸入繪師名稱。".to_string()));
        }
        if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(AuthError::Validation(format!(
                "繪師名稱不能超過 {MAX_DISPLAY_NAME_LENGTH} 個字。"
            )));
        }
        let identity = Identity {
            user_id: name.to_string(),
            display_name: name.to_string(),
        };
        tracing::info!(artist = %identity.display_name, "Local artist signed in");
        self.tx.send_replace(Some(identity.clone()));
        Ok(identity)
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    /// The first field carries the artist name; the secret is ignored.
    async fn sign_in(&self, name: &str, _secret: &str) -> Result<Identity, AuthError> {
        self.sign_in_as(name)
    }

    async fn sign_up(
        &self,
        _email: &str,
        _secret: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        self.sign_in_as(display_name)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.tx.send_replace(None);
        Ok(())
    }

    fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}
