//! Visibility and filter rules: which commissions a viewer may see.
//!
//! Resolution happens in a fixed order:
//!
//! 1. **Ownership scope** ([`ViewerState::resolve`]): admins only ever see
//!    records whose `artist_id` equals their display name; clients see every
//!    record, or one artist's records when an artist scope is selected.
//! 2. **Visibility gate** ([`ViewerState::gate_open`]): an anonymous client
//!    sees nothing until they type a search term or pick an artist.
//! 3. **Text match** ([`matches_text`]) and 4. **status filter**
//!    ([`matches_status`]).
//!
//! Stat tiles are computed after step 1 only, so they keep describing the
//! whole scope while the list underneath is narrowed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::commission::Commission;
use crate::identity::Identity;
use crate::status::CommissionStatus;

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Which side of the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Anonymous status lookup.
    #[default]
    Client,
    /// Artist back office.
    Admin,
}

/// The status dropdown: everything, or one exact stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "status")]
pub enum StatusFilter {
    #[default]
    All,
    Only(CommissionStatus),
}

/// Client-mode artist selector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "artist")]
pub enum ArtistScope {
    #[default]
    All,
    Artist(String),
}

/// Everything the viewer typed or picked above the list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub search_term: String,
    pub status_filter: StatusFilter,
    pub artist_scope: ArtistScope,
}

impl SearchCriteria {
    /// The search term as used for gating and matching.
    pub fn term(&self) -> &str {
        self.search_term.trim()
    }
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Case-insensitive substring match on client name, title and id; clients
/// may additionally match on the artist's name.
pub fn matches_text(commission: &Commission, term: &str, mode: ViewMode) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&commission.client_name)
        || hit(&commission.title)
        || hit(&commission.id)
        || (mode == ViewMode::Client && hit(&commission.artist_id))
}

pub fn matches_status(commission: &Commission, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Only(status) => commission.status == status,
    }
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// A viewer together with the commissions inside their ownership scope.
///
/// Admin-only data (identity, owned records) only exists on the
/// [`ViewerState::Admin`] variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerState<'a> {
    Client {
        scope: &'a ArtistScope,
        search_term: &'a str,
        candidates: Vec<&'a Commission>,
    },
    Admin {
        identity: &'a Identity,
        owned: Vec<&'a Commission>,
    },
    /// Admin mode without an identity: only the sign-in flow is reachable.
    SignedOut,
}

impl<'a> ViewerState<'a> {
    /// Apply the ownership scope.
    pub fn resolve(
        mode: ViewMode,
        identity: Option<&'a Identity>,
        criteria: &'a SearchCriteria,
        commissions: &'a [Commission],
    ) -> Self {
        match mode {
            ViewMode::Admin => match identity {
                Some(identity) => ViewerState::Admin {
                    identity,
                    owned: commissions
                        .iter()
                        .filter(|c| c.is_owned_by(&identity.display_name))
                        .collect(),
                },
                None => ViewerState::SignedOut,
            },
            ViewMode::Client => {
                let candidates = match &criteria.artist_scope {
                    ArtistScope::All => commissions.iter().collect(),
                    ArtistScope::Artist(artist) => commissions
                        .iter()
                        .filter(|c| c.artist_id == *artist)
                        .collect(),
                };
                ViewerState::Client {
                    scope: &criteria.artist_scope,
                    search_term: criteria.term(),
                    candidates,
                }
            }
        }
    }

    pub fn mode(&self) -> ViewMode {
        match self {
            ViewerState::Client { .. } => ViewMode::Client,
            ViewerState::Admin { .. } | ViewerState::SignedOut => ViewMode::Admin,
        }
    }

    /// Records inside the ownership scope.
    pub fn scoped(&self) -> &[&'a Commission] {
        match self {
            ViewerState::Client { candidates, .. } => candidates,
            ViewerState::Admin { owned, .. } => owned,
            ViewerState::SignedOut => &[],
        }
    }

    /// Whether any list may render at all.
    pub fn gate_open(&self) -> bool {
        match self {
            ViewerState::Client {
                scope, search_term, ..
            } => !search_term.is_empty() || **scope != ArtistScope::All,
            ViewerState::Admin { .. } => true,
            ViewerState::SignedOut => false,
        }
    }

    /// Stat tiles over the ownership-scoped set.
    pub fn stats(&self) -> CommissionStats {
        CommissionStats::from_records(self.scoped().iter().copied())
    }

    /// Apply the gate, text match and status filter.
    pub fn list(&self, criteria: &SearchCriteria) -> ListView<'a> {
        match self {
            ViewerState::SignedOut => ListView::LoginRequired,
            _ if !self.gate_open() => ListView::SearchPrompt,
            ViewerState::Admin { owned, .. } if owned.is_empty() => ListView::NothingOwned,
            _ => {
                let mode = self.mode();
                let results: Vec<&'a Commission> = self
                    .scoped()
                    .iter()
                    .copied()
                    .filter(|c| matches_text(c, criteria.term(), mode))
                    .filter(|c| matches_status(c, criteria.status_filter))
                    .collect();
                if results.is_empty() {
                    ListView::NoMatches
                } else {
                    ListView::Results(results)
                }
            }
        }
    }
}

/// What the list area shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<'a> {
    /// Admin mode with nobody signed in.
    LoginRequired,
    /// Client mode with the gate closed: "type something to search".
    SearchPrompt,
    /// Signed-in artist who owns no commissions yet.
    NothingOwned,
    /// The gate is open but nothing passed the filters.
    NoMatches,
    Results(Vec<&'a Commission>),
}

impl<'a> ListView<'a> {
    /// Displayed records; empty for every placeholder state.
    pub fn records(&self) -> &[&'a Commission] {
        match self {
            ListView::Results(records) => records,
            _ => &[],
        }
    }
}

/// Resolve the displayed list in one call.
pub fn visible_commissions<'a>(
    mode: ViewMode,
    identity: Option<&'a Identity>,
    criteria: &'a SearchCriteria,
    commissions: &'a [Commission],
) -> ListView<'a> {
    ViewerState::resolve(mode, identity, criteria, commissions).list(criteria)
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Counts shown on the dashboard stat tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CommissionStats {
    pub queue: usize,
    pub active: usize,
    pub done: usize,
}

impl CommissionStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Commission>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut stats, commission| {
                match commission.status {
                    CommissionStatus::Queue => stats.queue += 1,
                    CommissionStatus::Done => stats.done += 1,
                    status if status.is_active() => stats.active += 1,
                    _ => {}
                }
                stats
            })
    }
}

/// Distinct artist names, sorted, for the client-mode artist selector.
pub fn artist_directory(commissions: &[Commission]) -> Vec<String> {
    commissions
        .iter()
        .map(|c| c.artist_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
