//! Session / identity gate.
//!
//! Owns the viewer mode and the current identity. Switching back to client
//! mode keeps the identity so an artist can flip between views without
//! signing in again; only [`SessionGate::logout`] clears it.

use crate::error::{AuthError, MutationError};
use crate::identity::{validate_registration, validate_sign_in, Identity, IdentityProvider};
use crate::visibility::ViewMode;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionGate {
    mode: ViewMode,
    identity: Option<Identity>,
}

impl SessionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an identity restored by the provider.
    pub fn with_identity(identity: Option<Identity>) -> Self {
        Self {
            mode: ViewMode::Client,
            identity,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "View mode changed");
        }
        self.mode = mode;
    }

    /// Flip between client and admin mode, returning the new mode.
    pub fn toggle_mode(&mut self) -> ViewMode {
        let next = match self.mode {
            ViewMode::Client => ViewMode::Admin,
            ViewMode::Admin => ViewMode::Client,
        };
        self.set_mode(next);
        next
    }

    /// Admin mode without an identity: everything but the login flow is
    /// blocked.
    pub fn needs_login(&self) -> bool {
        self.mode == ViewMode::Admin && self.identity.is_none()
    }

    /// The identity allowed to mutate, if the viewer is a signed-in admin.
    pub fn admin_identity(&self) -> Result<&Identity, MutationError> {
        if self.mode != ViewMode::Admin {
            return Err(MutationError::NotAdmin);
        }
        self.identity.as_ref().ok_or(MutationError::NotSignedIn)
    }

    /// Accept an identity change reported by the provider (restored
    /// session, expired refresh token, sign-out elsewhere).
    pub fn apply_identity(&mut self, identity: Option<Identity>) {
        if self.identity != identity {
            match &identity {
                Some(id) => tracing::info!(user_id = %id.user_id, artist = %id.display_name, "Identity changed"),
                None => tracing::info!("Identity cleared"),
            }
        }
        self.identity = identity;
    }

    pub async fn sign_in<P>(
        &mut self,
        provider: &P,
        email: &str,
        secret: &str,
    ) -> Result<Identity, AuthError>
    where
        P: IdentityProvider + ?Sized,
    {
        validate_sign_in(email, secret)?;
        let identity = provider.sign_in(email.trim(), secret).await?;
        self.apply_identity(Some(identity.clone()));
        self.mode = ViewMode::Admin;
        Ok(identity)
    }

    /// Register a new artist. An empty display name is rejected before the
    /// provider is contacted.
    pub async fn register<P>(
        &mut self,
        provider: &P,
        email: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError>
    where
        P: IdentityProvider + ?Sized,
    {
        let display_name = validate_registration(email, secret, display_name)?;
        let identity = provider.sign_up(email.trim(), secret, display_name).await?;
        self.apply_identity(Some(identity.clone()));
        self.mode = ViewMode::Admin;
        Ok(identity)
    }

    /// Clear the identity and force client mode.
    ///
    /// The local state is cleared even when the provider call fails; the
    /// failure is still returned.
    pub async fn logout<P>(&mut self, provider: &P) -> Result<(), AuthError>
    where
        P: IdentityProvider + ?Sized,
    {
        let result = provider.sign_out().await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, "Provider sign-out failed, clearing local session anyway");
        }
        self.apply_identity(None);
        self.mode = ViewMode::Client;
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::watch;

    use super::*;

    struct CountingProvider {
        calls: AtomicUsize,
        fail_sign_out: bool,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_sign_out: false,
            }
        }
    }

    fn artist(name: &str) -> Identity {
        Identity {
            user_id: format!("uid-{name}"),
            display_name: name.to_string(),
        }
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        async fn sign_in(&self, _email: &str, secret: &str) -> Result<Identity, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if secret == "wrong" {
                return Err(AuthError::InvalidCredential);
            }
            Ok(artist("兔兔老師"))
        }

        async fn sign_up(
            &self,
            _email: &str,
            _secret: &str,
            display_name: &str,
        ) -> Result<Identity, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(artist(display_name))
        }

        async fn sign_out(&self) -> Result<(), AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sign_out {
                return Err(AuthError::Other("offline".into()));
            }
            Ok(())
        }

        fn current_identity(&self) -> Option<Identity> {
            None
        }

        fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
            watch::channel(None).1
        }
    }

    #[test]
    fn toggling_to_admin_without_identity_needs_login() {
        let mut gate = SessionGate::new();
        assert_eq!(gate.toggle_mode(), ViewMode::Admin);
        assert!(gate.needs_login());
        assert!(matches!(gate.admin_identity(), Err(MutationError::NotSignedIn)));
    }

    #[test]
    fn client_mode_never_authorizes_mutations() {
        let gate = SessionGate::with_identity(Some(artist("兔兔老師")));
        assert!(matches!(gate.admin_identity(), Err(MutationError::NotAdmin)));
    }

    #[tokio::test]
    async fn switching_back_to_client_keeps_identity() {
        let provider = CountingProvider::new();
        let mut gate = SessionGate::new();
        gate.set_mode(ViewMode::Admin);
        gate.sign_in(&provider, "bunny@example.com", "secret123")
            .await
            .unwrap();

        gate.toggle_mode();
        assert_eq!(gate.mode(), ViewMode::Client);
        assert!(gate.is_signed_in());

        gate.toggle_mode();
        assert_eq!(gate.admin_identity().unwrap().display_name, "兔兔老師");
    }

    #[tokio::test]
    async fn logout_clears_identity_and_forces_client_mode() {
        let provider = CountingProvider::new();
        let mut gate = SessionGate::new();
        gate.sign_in(&provider, "bunny@example.com", "secret123")
            .await
            .unwrap();
        assert_eq!(gate.mode(), ViewMode::Admin);

        gate.logout(&provider).await.unwrap();
        assert_eq!(gate.mode(), ViewMode::Client);
        assert!(gate.identity().is_none());
    }

    #[tokio::test]
    async fn failed_provider_logout_still_clears_locally() {
        let provider = CountingProvider {
            fail_sign_out: true,
            ..CountingProvider::new()
        };
        let mut gate = SessionGate::with_identity(Some(artist("熊熊繪圖")));
        gate.set_mode(ViewMode::Admin);

        assert!(gate.logout(&provider).await.is_err());
        assert!(gate.identity().is_none());
        assert_eq!(gate.mode(), ViewMode::Client);
    }

    #[tokio::test]
    async fn empty_display_name_never_reaches_provider() {
        let provider = CountingProvider::new();
        let mut gate = SessionGate::new();
        let err = gate
            .register(&provider, "new@example.com", "secret123", "  ")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(!gate.is_signed_in());
    }

    #[tokio::test]
    async fn registration_uses_trimmed_display_name() {
        let provider = CountingProvider::new();
        let mut gate = SessionGate::new();
        let identity = gate
            .register(&provider, "new@example.com", "secret123", " 熊熊繪圖 ")
            .await
            .unwrap();
        assert_eq!(identity.display_name, "熊熊繪圖");
    }

    #[tokio::test]
    async fn failed_sign_in_leaves_gate_untouched() {
        let provider = CountingProvider::new();
        let mut gate = SessionGate::new();
        gate.set_mode(ViewMode::Admin);

        let err = gate
            .sign_in(&provider, "bunny@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::InvalidCredential);
        assert!(gate.needs_login());
    }
}
