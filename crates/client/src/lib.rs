//! HTTP adapters for the ArtTrack dashboard.
//!
//! Implements the core persistence and identity collaborator traits against
//! the ArtTrack API server.

pub mod api;
pub mod config;
pub mod identity;
pub mod store;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use identity::HttpIdentityProvider;
pub use store::HttpCommissionStore;

use std::sync::Arc;

use arttrack_core::dashboard::Dashboard;
use arttrack_core::local_identity::LocalIdentityProvider;
use arttrack_core::local_store::{FileStorage, LocalCommissionStore};

/// A dashboard backed by the HTTP collaborators.
pub type HttpDashboard = Dashboard<HttpCommissionStore, HttpIdentityProvider>;

/// A dashboard that keeps everything under a local data directory.
pub type LocalDashboard = Dashboard<LocalCommissionStore<FileStorage>, LocalIdentityProvider>;

/// Wire a dashboard to the server at `config.api_url`.
///
/// The session and the commission type set live under `config.data_dir`.
/// Call [`HttpIdentityProvider::restore`] on the returned provider to
/// resume a previous session. Expired access tokens are renewed on demand.
pub fn connect(config: &ClientConfig) -> (HttpDashboard, Arc<HttpIdentityProvider>) {
    let api = Arc::new(ApiClient::new(config.api_url.clone()));
    let provider = Arc::new(HttpIdentityProvider::new(
        Arc::clone(&api),
        Box::new(FileStorage::new(config.data_dir.clone())),
    ));
    let store = Arc::new(HttpCommissionStore::new(api).with_session(Arc::clone(&provider)));
    let dashboard = Dashboard::new(store, Arc::clone(&provider))
        .with_type_storage(Box::new(FileStorage::new(config.data_dir.clone())));
    (dashboard, provider)
}

/// Wire a dashboard that needs no server.
///
/// Commissions and the type set are JSON files under `config.data_dir`;
/// signing in only takes an artist name, through
/// [`LocalIdentityProvider::sign_in_as`].
pub fn connect_local(config: &ClientConfig) -> (LocalDashboard, Arc<LocalIdentityProvider>) {
    let storage = FileStorage::new(config.data_dir.clone());
    let store = Arc::new(LocalCommissionStore::open(storage.clone()));
    let provider = Arc::new(LocalIdentityProvider::new());
    let dashboard = Dashboard::new(store, Arc::clone(&provider)).with_type_storage(Box::new(storage));
    (dashboard, provider)
}
