//! Mutation coordinator: create, advance/retreat and delete.
//!
//! Every operation requires a signed-in admin and, except for create, a
//! commission owned by that admin. Status changes and deletes go through
//! [`optimistic`] and roll back only the record they touched; create waits
//! for the store before touching the local list.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::commission::{Commission, CommissionDraft};
use crate::commission_types::CommissionTypeRegistry;
use crate::error::MutationError;
use crate::identity::Identity;
use crate::optimistic::optimistic;
use crate::session::SessionGate;
use crate::status::CommissionStatus;
use crate::store::CommissionStore;
use crate::types::CalendarDate;

/// The in-memory commission list, newest first.
pub type CommissionList = Arc<RwLock<Vec<Commission>>>;

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    CreateFailed,
    StatusChangeFailed,
    DeleteFailed,
}

/// Transient failure message shown after a mutation could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, err: &MutationError) -> Self {
        let headline = match kind {
            NoticeKind::CreateFailed => "新增委託失敗",
            NoticeKind::StatusChangeFailed => "更新狀態失敗，已還原變更",
            NoticeKind::DeleteFailed => "刪除委託失敗，已還原變更",
        };
        Self {
            kind,
            message: format!("{headline}：{err}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Which way a status change moves along the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Advance,
    Retreat,
}

impl Step {
    fn apply(self, status: CommissionStatus) -> CommissionStatus {
        match self {
            Step::Advance => status.advance(),
            Step::Retreat => status.retreat(),
        }
    }
}

pub struct MutationCoordinator<S: ?Sized> {
    store: Arc<S>,
    list: CommissionList,
}

impl<S: ?Sized> Clone for MutationCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            list: Arc::clone(&self.list),
        }
    }
}

impl<S> MutationCoordinator<S>
where
    S: CommissionStore + ?Sized,
{
    pub fn new(store: Arc<S>, list: CommissionList) -> Self {
        Self { store, list }
    }

    pub fn list(&self) -> &CommissionList {
        &self.list
    }

    /// Validate the form, persist, then prepend the stored record.
    ///
    /// On failure the local list is untouched.
    pub async fn create(
        &self,
        session: &SessionGate,
        draft: CommissionDraft,
        types: &CommissionTypeRegistry,
        today: CalendarDate,
    ) -> Result<Commission, MutationError> {
        let owner = session.admin_identity()?;
        let new = draft.into_new_commission(owner, types, today)?;

        let created = self.store.create(new).await?;
        tracing::info!(
            commission_id = %created.id,
            artist = %created.artist_id,
            "Commission created"
        );

        self.list.write().await.insert(0, created.clone());
        Ok(created)
    }

    pub async fn advance(
        &self,
        session: &SessionGate,
        id: &str,
        today: CalendarDate,
    ) -> Result<CommissionStatus, MutationError> {
        self.change_status(session, id, Step::Advance, today).await
    }

    pub async fn retreat(
        &self,
        session: &SessionGate,
        id: &str,
        today: CalendarDate,
    ) -> Result<CommissionStatus, MutationError> {
        self.change_status(session, id, Step::Retreat, today).await
    }

    /// Move one stage, optimistically.
    ///
    /// At either end of the pipeline this is a no-op that issues no store
    /// call. Returns the resulting status.
    pub async fn change_status(
        &self,
        session: &SessionGate,
        id: &str,
        step: Step,
        today: CalendarDate,
    ) -> Result<CommissionStatus, MutationError> {
        let owner = session.admin_identity()?;
        let current = self.owned_status(owner, id).await?;
        let target = step.apply(current);
        if target == current {
            return Ok(current);
        }

        optimistic(
            &self.list,
            |list| {
                list.iter_mut().find(|c| c.id == id).map(|c| {
                    let previous = (c.status, c.last_updated);
                    c.apply_status(target, today);
                    previous
                })
            },
            || self.store.set_status(id, target),
            |list, previous| {
                let record = list.iter_mut().find(|c| c.id == id);
                if let (Some(c), Some((status, last_updated))) = (record, previous) {
                    c.status = status;
                    c.last_updated = last_updated;
                }
            },
        )
        .await?;

        tracing::info!(commission_id = %id, from = %current, to = %target, "Status changed");
        Ok(target)
    }

    /// Remove a commission optimistically. The caller is responsible for
    /// the two-click confirmation.
    pub async fn delete(&self, session: &SessionGate, id: &str) -> Result<(), MutationError> {
        let owner = session.admin_identity()?;
        self.owned_status(owner, id).await?;

        optimistic(
            &self.list,
            |list| {
                let index = list.iter().position(|c| c.id == id)?;
                Some((index, list.remove(index)))
            },
            || self.store.delete(id),
            |list, removed| {
                if let Some((index, commission)) = removed {
                    // Neighbours may have come or gone meanwhile.
                    let index = index.min(list.len());
                    list.insert(index, commission);
                }
            },
        )
        .await?;

        tracing::info!(commission_id = %id, "Commission deleted");
        Ok(())
    }

    /// Check that the signed-in admin may mutate `id`, without mutating.
    pub async fn ensure_owned(&self, session: &SessionGate, id: &str) -> Result<(), MutationError> {
        let owner = session.admin_identity()?;
        self.owned_status(owner, id).await.map(|_| ())
    }

    async fn owned_status(
        &self,
        owner: &Identity,
        id: &str,
    ) -> Result<CommissionStatus, MutationError> {
        let list = self.list.read().await;
        let commission = list
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| MutationError::NotFound(id.to_string()))?;
        if !commission.is_owned_by(&owner.display_name) {
            return Err(MutationError::NotOwner(id.to_string()));
        }
        Ok(commission.status)
    }
}
