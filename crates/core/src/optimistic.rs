//! Optimistic mutation: apply locally, persist, roll back on failure.
//!
//! The local apply always completes before the remote call is issued, and
//! the rollback only runs after that call has failed. No lock is held while
//! the remote call is in flight, so other mutations may interleave; each
//! rollback undoes only its own change.

use std::future::Future;

use tokio::sync::RwLock;

use crate::error::StoreError;

/// Run one optimistic mutation against `state`.
///
/// `apply` mutates the local state and returns whatever `rollback` needs to
/// undo it. `remote` is only invoked after `apply` returns.
pub async fn optimistic<S, U, T, R, F>(
    state: &RwLock<S>,
    apply: impl FnOnce(&mut S) -> U,
    remote: R,
    rollback: impl FnOnce(&mut S, U),
) -> Result<T, StoreError>
where
    R: FnOnce() -> F,
    F: Future<Output = Result<T, StoreError>>,
{
    let undo = {
        let mut guard = state.write().await;
        apply(&mut guard)
    };

    match remote().await {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!(error = %err, "Remote call failed, rolling back local change");
            let mut guard = state.write().await;
            rollback(&mut guard, undo);
            Err(err)
        }
    }
}
