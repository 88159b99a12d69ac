//! Two-click delete confirmation.
//!
//! Each row is either idle or armed until a deadline. The first click arms
//! a row, a second click inside the window confirms it. Arming schedules a
//! cancellable timer that disarms the row once the window passes; arming a
//! different row or disarming explicitly cancels the pending timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How long an armed delete button waits for its second click.
pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// Confirmation state of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Idle,
    ArmedUntil(Instant),
}

/// Outcome of a delete click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteClick {
    /// First click: the row now asks for confirmation.
    Armed,
    /// Second click inside the window: go ahead and delete.
    Confirmed,
}

#[derive(Debug)]
struct ArmedRow {
    id: String,
    until: Instant,
    generation: u64,
    cancel: CancellationToken,
}

#[derive(Debug, Default)]
struct Slot {
    armed: Option<ArmedRow>,
    generation: u64,
}

impl Slot {
    fn take(&mut self) -> Option<ArmedRow> {
        let row = self.armed.take();
        if let Some(row) = &row {
            row.cancel.cancel();
        }
        row
    }
}

/// Delete confirmation for a whole list. At most one row is armed at a time.
#[derive(Debug, Clone)]
pub struct DeleteConfirmations {
    window: Duration,
    slot: Arc<Mutex<Slot>>,
}

impl Default for DeleteConfirmations {
    fn default() -> Self {
        Self::new()
    }
}

impl DeleteConfirmations {
    pub fn new() -> Self {
        Self::with_window(DELETE_CONFIRM_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Register a click on the delete button of row `id`.
    ///
    /// Must be called from within a tokio runtime; arming spawns the
    /// disarm timer.
    pub async fn click(&self, id: &str) -> DeleteClick {
        let mut slot = self.slot.lock().await;
        let now = Instant::now();

        let confirms = slot
            .armed
            .as_ref()
            .is_some_and(|row| row.id == id && now < row.until);
        if confirms {
            slot.take();
            tracing::debug!(commission_id = %id, "Delete confirmed");
            return DeleteClick::Confirmed;
        }

        slot.take();
        slot.generation += 1;
        let generation = slot.generation;
        let until = now + self.window;
        let cancel = CancellationToken::new();

        slot.armed = Some(ArmedRow {
            id: id.to_string(),
            until,
            generation,
            cancel: cancel.clone(),
        });
        drop(slot);

        let shared = Arc::clone(&self.slot);
        let row_id = id.to_string();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep_until(until) => {
                    let mut slot = shared.lock().await;
                    let still_ours = slot
                        .armed
                        .as_ref()
                        .is_some_and(|row| row.generation == generation);
                    if still_ours {
                        slot.armed = None;
                        tracing::debug!(commission_id = %row_id, "Delete confirmation expired");
                    }
                }
            }
        });

        tracing::debug!(commission_id = %id, "Delete armed");
        DeleteClick::Armed
    }

    pub async fn state(&self, id: &str) -> RowState {
        let slot = self.slot.lock().await;
        match &slot.armed {
            Some(row) if row.id == id && Instant::now() < row.until => {
                RowState::ArmedUntil(row.until)
            }
            _ => RowState::Idle,
        }
    }

    pub async fn is_armed(&self, id: &str) -> bool {
        matches!(self.state(id).await, RowState::ArmedUntil(_))
    }

    /// Disarm whatever row is armed and cancel its timer.
    pub async fn clear(&self) {
        self.slot.lock().await.take();
    }
}
