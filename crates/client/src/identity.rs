//! [`IdentityProvider`] over the ArtTrack HTTP API.
//!
//! The refresh token is kept in local key/value storage under
//! [`SESSION_KEY`] so a session survives restarts; [`HttpIdentityProvider::restore`]
//! exchanges it for a fresh access token on startup.

use std::sync::Arc;

use arttrack_core::error::AuthError;
use arttrack_core::identity::{Identity, IdentityProvider};
use arttrack_core::local_store::{KeyValueStorage, SESSION_KEY};
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{watch, Mutex};

use crate::api::ApiClient;

/// Body returned by signup, login and refresh.
#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
    user: Identity,
}

/// What is persisted between runs.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    refresh_token: String,
}

pub struct HttpIdentityProvider {
    api: Arc<ApiClient>,
    storage: Mutex<Box<dyn KeyValueStorage>>,
    tx: watch::Sender<Option<Identity>>,
    /// Serializes token rotation.
    refresh_lock: Mutex<()>,
}

impl HttpIdentityProvider {
    pub fn new(api: Arc<ApiClient>, storage: Box<dyn KeyValueStorage>) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            api,
            storage: Mutex::new(storage),
            tx,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Resume a persisted session, if any.
    ///
    /// A rejected or unreadable refresh token is discarded and the viewer
    /// stays signed out. When the server cannot be reached the token is kept
    /// so a later call can try again.
    pub async fn restore(&self) -> Result<Option<Identity>, AuthError> {
        let stored = self.storage.lock().await.get(SESSION_KEY);
        let session = match stored {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed persisted session");
                    self.forget().await;
                    return Ok(None);
                }
            },
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted session");
                return Ok(None);
            }
        };
        let _guard = self.refresh_lock.lock().await;
        self.refresh_with(&session.refresh_token).await.map(Some)
    }

    /// Exchange the persisted refresh token for a new access token.
    ///
    /// On rejection the identity is cleared and observers see `None`.
    pub async fn refresh(&self) -> Result<Identity, AuthError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Refresh after a request sent with `stale` came back unauthorized.
    ///
    /// Concurrent callers share one refresh: if the access token already
    /// changed since `stale` was read, this returns without contacting the
    /// server, since the rotated refresh token would be rejected.
    pub async fn refresh_after(&self, stale: Option<&str>) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;
        if self.api.access_token().await.as_deref() != stale {
            return Ok(());
        }
        self.refresh_locked().await.map(|_| ())
    }

    async fn refresh_locked(&self) -> Result<Identity, AuthError> {
        let stored = self
            .storage
            .lock()
            .await
            .get(SESSION_KEY)
            .map_err(|e| AuthError::Other(e.to_string()))?;
        let token = stored
            .and_then(|raw| serde_json::from_str::<PersistedSession>(&raw).ok())
            .map(|s| s.refresh_token)
            .ok_or_else(|| AuthError::Other("No session to refresh".to_string()))?;
        self.refresh_with(&token).await
    }

    async fn refresh_with(&self, refresh_token: &str) -> Result<Identity, AuthError> {
        let result = self
            .api
            .send_json::<_, AuthResponse>(
                Method::POST,
                "/auth/refresh",
                &json!({ "refresh_token": refresh_token }),
            )
            .await;
        match result {
            Ok(response) => Ok(self.adopt(response).await),
            Err(e) if e.is_unauthorized() => {
                tracing::info!(error = %e, "Session refresh rejected, signing out locally");
                self.forget().await;
                Err(e.into())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, keeping persisted session");
                Err(AuthError::Other(e.to_string()))
            }
        }
    }

    /// Take the tokens and identity from a successful auth response.
    async fn adopt(&self, response: AuthResponse) -> Identity {
        self.api.set_access_token(Some(response.access_token)).await;

        let persisted = PersistedSession {
            refresh_token: response.refresh_token,
        };
        match serde_json::to_string(&persisted) {
            Ok(raw) => {
                if let Err(e) = self.storage.lock().await.set(SESSION_KEY, &raw) {
                    tracing::warn!(error = %e, "Failed to persist session");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode session"),
        }

        self.tx.send_replace(Some(response.user.clone()));
        response.user
    }

    /// Drop tokens and identity locally.
    async fn forget(&self) {
        self.api.set_access_token(None).await;
        if let Err(e) = self.storage.lock().await.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
        self.tx.send_replace(None);
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, secret: &str) -> Result<Identity, AuthError> {
        let response: AuthResponse = self
            .api
            .send_json(
                Method::POST,
                "/auth/login",
                &json!({ "email": email, "password": secret }),
            )
            .await?;
        Ok(self.adopt(response).await)
    }

    async fn sign_up(
        &self,
        email: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let response: AuthResponse = self
            .api
            .send_json(
                Method::POST,
                "/auth/signup",
                &json!({ "email": email, "password": secret, "display_name": display_name }),
            )
            .await?;
        Ok(self.adopt(response).await)
    }

    /// Revoke server sessions, then clear local state whatever the outcome.
    async fn sign_out(&self) -> Result<(), AuthError> {
        let result = if self.api.has_access_token().await {
            self.api
                .send_empty::<()>(Method::POST, "/auth/logout", None)
                .await
                .map_err(AuthError::from)
        } else {
            Ok(())
        };
        self.forget().await;
        result
    }

    fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}
