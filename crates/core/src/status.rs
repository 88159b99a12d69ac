//! The commission status pipeline.
//!
//! Six fixed, ordered production stages. A commission only ever moves one
//! stage at a time through [`CommissionStatus::advance`] and
//! [`CommissionStatus::retreat`]; both saturate at the ends instead of
//! wrapping or failing.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Stored value for each stage (database column and JSON field).
pub const STATUS_QUEUE: &str = "queue";
pub const STATUS_SKETCH: &str = "sketch";
pub const STATUS_LINE_ART: &str = "line_art";
pub const STATUS_COLOR: &str = "color";
pub const STATUS_RENDER: &str = "render";
pub const STATUS_DONE: &str = "done";

/// All valid stored status values, in pipeline order.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_QUEUE,
    STATUS_SKETCH,
    STATUS_LINE_ART,
    STATUS_COLOR,
    STATUS_RENDER,
    STATUS_DONE,
];

// ---------------------------------------------------------------------------
// Enum
// ---------------------------------------------------------------------------

/// A production stage of a commission.
///
/// Serializes as the snake_case stored value; the Traditional Chinese display
/// labels are accepted as aliases so collections saved by older dashboards
/// still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    #[serde(alias = "排單中")]
    Queue,
    #[serde(alias = "草稿")]
    Sketch,
    #[serde(alias = "線稿")]
    LineArt,
    #[serde(alias = "上色")]
    Color,
    #[serde(alias = "完稿精修")]
    Render,
    #[serde(alias = "結案")]
    Done,
}

/// The pipeline, in order. A stage's position is its index here.
pub const STATUS_STEPS: [CommissionStatus; 6] = [
    CommissionStatus::Queue,
    CommissionStatus::Sketch,
    CommissionStatus::LineArt,
    CommissionStatus::Color,
    CommissionStatus::Render,
    CommissionStatus::Done,
];

impl CommissionStatus {
    /// The initial stage of every new commission.
    pub const INITIAL: Self = Self::Queue;

    /// The terminal stage.
    pub const TERMINAL: Self = Self::Done;

    /// Convert from a stored string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_QUEUE => Ok(Self::Queue),
            STATUS_SKETCH => Ok(Self::Sketch),
            STATUS_LINE_ART => Ok(Self::LineArt),
            STATUS_COLOR => Ok(Self::Color),
            STATUS_RENDER => Ok(Self::Render),
            STATUS_DONE => Ok(Self::Done),
            _ => Err(format!(
                "Invalid status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the stored string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => STATUS_QUEUE,
            Self::Sketch => STATUS_SKETCH,
            Self::LineArt => STATUS_LINE_ART,
            Self::Color => STATUS_COLOR,
            Self::Render => STATUS_RENDER,
            Self::Done => STATUS_DONE,
        }
    }

    /// Display label shown on status badges.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Queue => "排單中",
            Self::Sketch => "草稿",
            Self::LineArt => "線稿",
            Self::Color => "上色",
            Self::Render => "完稿精修",
            Self::Done => "結案",
        }
    }

    /// 0-based position in [`STATUS_STEPS`].
    pub fn index(&self) -> usize {
        match self {
            Self::Queue => 0,
            Self::Sketch => 1,
            Self::LineArt => 2,
            Self::Color => 3,
            Self::Render => 4,
            Self::Done => 5,
        }
    }

    /// The next stage, or `self` when already [`Self::TERMINAL`].
    pub fn advance(self) -> Self {
        STATUS_STEPS.get(self.index() + 1).copied().unwrap_or(self)
    }

    /// The previous stage, or `self` when already [`Self::INITIAL`].
    pub fn retreat(self) -> Self {
        match self.index().checked_sub(1) {
            Some(prev) => STATUS_STEPS.get(prev).copied().unwrap_or(self),
            None => self,
        }
    }

    pub fn can_advance(&self) -> bool {
        *self != Self::TERMINAL
    }

    pub fn can_retreat(&self) -> bool {
        *self != Self::INITIAL
    }

    /// Work has started but is not finished. Used for the "active" stat tile.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Queue | Self::Done)
    }
}

impl fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advancing_from_queue_reaches_done_and_stays() {
        let mut status = CommissionStatus::Queue;
        for _ in 0..5 {
            status = status.advance();
        }
        assert_eq!(status, CommissionStatus::Done);
        assert_eq!(status.advance(), CommissionStatus::Done);
        assert_eq!(status.advance().advance(), CommissionStatus::Done);
    }

    #[test]
    fn retreating_from_done_reaches_queue_and_stays() {
        let mut status = CommissionStatus::Done;
        for _ in 0..5 {
            status = status.retreat();
        }
        assert_eq!(status, CommissionStatus::Queue);
        assert_eq!(status.retreat(), CommissionStatus::Queue);
    }

    #[test]
    fn every_transition_moves_exactly_one_step() {
        for status in STATUS_STEPS {
            let next = status.advance();
            if status != CommissionStatus::Done {
                assert_eq!(next.index(), status.index() + 1);
            }
            let prev = status.retreat();
            if status != CommissionStatus::Queue {
                assert_eq!(prev.index() + 1, status.index());
            }
        }
    }

    #[test]
    fn index_matches_pipeline_position() {
        for (i, status) in STATUS_STEPS.iter().enumerate() {
            assert_eq!(status.index(), i);
        }
    }

    #[test]
    fn active_excludes_queue_and_done() {
        let active: Vec<_> = STATUS_STEPS.iter().filter(|s| s.is_active()).collect();
        assert_eq!(active.len(), 4);
        assert!(!CommissionStatus::Queue.is_active());
        assert!(!CommissionStatus::Done.is_active());
    }

    #[test]
    fn stored_value_round_trips() {
        for status in STATUS_STEPS {
            assert_eq!(CommissionStatus::from_str_value(status.as_str()), Ok(status));
        }
    }

    #[test]
    fn unknown_stored_value_rejected() {
        let err = CommissionStatus::from_str_value("archived").unwrap_err();
        assert!(err.contains("Invalid status"));
    }

    #[test]
    fn legacy_label_is_accepted_when_deserializing() {
        let status: CommissionStatus = serde_json::from_str("\"完稿精修\"").unwrap();
        assert_eq!(status, CommissionStatus::Render);
        let status: CommissionStatus = serde_json::from_str("\"line_art\"").unwrap();
        assert_eq!(status, CommissionStatus::LineArt);
    }

    #[test]
    fn ends_cannot_move_further() {
        assert!(!CommissionStatus::Done.can_advance());
        assert!(!CommissionStatus::Queue.can_retreat());
        assert!(CommissionStatus::Color.can_advance());
        assert!(CommissionStatus::Color.can_retreat());
    }
}
