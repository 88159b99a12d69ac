//! Persistence collaborator contract.

use async_trait::async_trait;

use crate::commission::{Commission, NewCommission};
use crate::error::StoreError;
use crate::status::CommissionStatus;

/// A backing store for commissions.
///
/// Listings are ordered newest `date_added` first. Every call may fail; the
/// caller decides how (rollback for mutations, error screen for loads).
#[async_trait]
pub trait CommissionStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Commission>, StoreError>;

    async fn list_for_owner(&self, artist_id: &str) -> Result<Vec<Commission>, StoreError>;

    /// Persist a new record and return it with its assigned id.
    async fn create(&self, data: NewCommission) -> Result<Commission, StoreError>;

    /// Set the status and stamp a fresh `last_updated`.
    async fn set_status(&self, id: &str, status: CommissionStatus) -> Result<(), StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// List an artist's commissions, falling back to filtering `list_all`
/// client-side when the store cannot serve the owner query.
///
/// Only [`StoreError::Unsupported`] triggers the fallback; permission and
/// transport failures propagate unchanged.
pub async fn list_for_owner_or_filter<S>(
    store: &S,
    artist_id: &str,
) -> Result<Vec<Commission>, StoreError>
where
    S: CommissionStore + ?Sized,
{
    match store.list_for_owner(artist_id).await {
        Err(StoreError::Unsupported(reason)) => {
            tracing::warn!(
                artist_id,
                reason = %reason,
                "Owner query unsupported, filtering full listing instead"
            );
            let all = store.list_all().await?;
            Ok(all.into_iter().filter(|c| c.is_owned_by(artist_id)).collect())
        }
        other => other,
    }
}

/// Sort newest `date_added` first, keeping insertion order among equals.
pub fn sort_newest_first(commissions: &mut [Commission]) {
    commissions.sort_by(|a, b| b.date_added.cmp(&a.date_added));
}

/// Why the initial bulk load failed; selects the error screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// Access rules rejected the load: show setup instructions.
    PermissionDenied { message: String },
    /// Anything else: show the raw message and a manual reload action.
    Diagnostic { message: String },
}

impl From<StoreError> for LoadFailure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied(message) => LoadFailure::PermissionDenied { message },
            other => LoadFailure::Diagnostic {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::seed::default_commissions;

    /// Store whose owner query always fails with a configurable error.
    struct OwnerQueryFails {
        error: StoreError,
        list_all_calls: AtomicUsize,
    }

    #[async_trait]
    impl CommissionStore for OwnerQueryFails {
        async fn list_all(&self) -> Result<Vec<Commission>, StoreError> {
            self.list_all_calls.fetch_add(1, Ordering::SeqCst);
            Ok(default_commissions())
        }

        async fn list_for_owner(&self, _artist_id: &str) -> Result<Vec<Commission>, StoreError> {
            Err(self.error.clone())
        }

        async fn create(&self, _data: NewCommission) -> Result<Commission, StoreError> {
            Err(StoreError::Transport("read only".into()))
        }

        async fn set_status(&self, _id: &str, _s: CommissionStatus) -> Result<(), StoreError> {
            Err(StoreError::Transport("read only".into()))
        }

        async fn delete(&self, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::Transport("read only".into()))
        }
    }

    fn failing(error: StoreError) -> OwnerQueryFails {
        OwnerQueryFails {
            error,
            list_all_calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn unsupported_owner_query_falls_back_to_filtering() {
        let store = failing(StoreError::Unsupported("index missing".into()));
        let owned = list_for_owner_or_filter(&store, "熊熊繪圖").await.unwrap();
        assert_eq!(owned.len(), 2);
        assert!(owned.iter().all(|c| c.artist_id == "熊熊繪圖"));
        assert_eq!(store.list_all_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn permission_denied_is_never_papered_over() {
        let store = failing(StoreError::PermissionDenied("rules".into()));
        let err = list_for_owner_or_filter(&store, "熊熊繪圖").await.unwrap_err();
        assert!(err.is_permission_denied());
        assert_eq!(store.list_all_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let store = failing(StoreError::Transport("offline".into()));
        let err = list_for_owner_or_filter(&store, "熊熊繪圖").await.unwrap_err();
        assert_eq!(err, StoreError::Transport("offline".into()));
    }

    #[test]
    fn sort_puts_newest_first() {
        let mut data = default_commissions();
        sort_newest_first(&mut data);
        let ids: Vec<_> = data.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c-103", "c-102", "c-101", "c-104"]);
    }

    #[test]
    fn load_failure_distinguishes_permission_denied() {
        assert!(matches!(
            LoadFailure::from(StoreError::PermissionDenied("no".into())),
            LoadFailure::PermissionDenied { .. }
        ));
        assert!(matches!(
            LoadFailure::from(StoreError::Transport("offline".into())),
            LoadFailure::Diagnostic { message } if message.contains("offline")
        ));
    }
}
