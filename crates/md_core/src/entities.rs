//! Canonical data model shared by the resolvers.
//!
//! Everything here is a derived, read-only view built from a persisted match
//! or vote record. Nothing in this module mutates after construction.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tokens::PlayerId;

/// 0-based team position within a match (stable across games).
pub type TeamIndex = usize;

/// Fixed rotation for three-team pods: game `i` is played by pair `i % 3`.
pub const ROUND_ROBIN_3_PAIRS: [(TeamIndex, TeamIndex); 3] = [(0, 1), (1, 2), (0, 2)];

/// Rotation pair for game `game_idx` of a three-team pod.
#[inline]
pub fn rotation_pair(game_idx: usize) -> (TeamIndex, TeamIndex) {
    ROUND_ROBIN_3_PAIRS[game_idx % ROUND_ROBIN_3_PAIRS.len()]
}

/* -------------------------------------------------------------------------- */
/*                                Score matrix                                */
/* -------------------------------------------------------------------------- */

/// Per-game, per-team scores. Each row has exactly `team_count` slots;
/// `None` marks a team that did not play in that game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    team_count: usize,
    games: Vec<Vec<Option<u32>>>,
}

impl ScoreMatrix {
    /// Build a matrix, padding short rows with `None` and truncating long ones
    /// so every row references only team indices `< team_count`.
    pub fn new(team_count: usize, games: Vec<Vec<Option<u32>>>) -> Self {
        let games = games
            .into_iter()
            .map(|mut row| {
                row.resize(team_count, None);
                row
            })
            .collect();
        Self { team_count, games }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn team_count(&self) -> usize {
        self.team_count
    }

    pub fn games(&self) -> &[Vec<Option<u32>>] {
        &self.games
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Score of `team` in `game`, if recorded.
    pub fn score(&self, game: usize, team: TeamIndex) -> Option<u32> {
        self.games.get(game).and_then(|row| row.get(team).copied().flatten())
    }

    /// Teams with a recorded score in `game`, ascending.
    pub fn participants(&self, game: usize) -> Vec<TeamIndex> {
        match self.games.get(game) {
            Some(row) => row
                .iter()
                .enumerate()
                .filter_map(|(t, s)| s.map(|_| t))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Cumulative score; unrecorded games count as 0.
    pub fn total(&self, team: TeamIndex) -> u64 {
        self.games
            .iter()
            .filter_map(|row| row.get(team).copied().flatten())
            .map(u64::from)
            .sum()
    }

    /// Number of games with a recorded score for `team`.
    pub fn appearances(&self, team: TeamIndex) -> usize {
        self.games
            .iter()
            .filter(|row| matches!(row.get(team), Some(Some(_))))
            .count()
    }

    /// True when at least one score has been recorded.
    pub fn has_score_data(&self) -> bool {
        self.games.iter().any(|row| row.iter().any(Option::is_some))
    }

    pub fn is_empty(&self) -> bool {
        !self.has_score_data()
    }

    /// Same matrix with team order permuted: new slot `i` holds old team `order[i]`.
    /// Out-of-range entries produce empty slots.
    pub fn permuted(&self, order: &[TeamIndex]) -> Self {
        let games = self
            .games
            .iter()
            .map(|row| order.iter().map(|&t| row.get(t).copied().flatten()).collect())
            .collect();
        Self::new(order.len(), games)
    }
}

/* -------------------------------------------------------------------------- */
/*                              Field assignment                              */
/* -------------------------------------------------------------------------- */

/// The two team groups playing simultaneously in one game, one per field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPairing {
    pub first: Vec<TeamIndex>,
    pub second: Vec<TeamIndex>,
}

/// Per-game field pairings for dual-field matches (index aligned with games).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAssignment {
    pub games: Vec<FieldPairing>,
}

impl FieldAssignment {
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

/* -------------------------------------------------------------------------- */
/*                              Votes & records                               */
/* -------------------------------------------------------------------------- */

/// One accepted "best player" vote. `candidate == None` marks malformed input
/// that still counts toward the denominator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub candidate: Option<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Vote {
    pub fn for_candidate(candidate: PlayerId) -> Self {
        Self { candidate: Some(candidate), voter: None, created_at: None }
    }
}

/// Per-candidate performance counters used by the tie-break cascade.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TieBreakerRecord {
    pub goals: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub appearances: u32,
}

serde_enum!(
    /// Tie-break criteria, in cascade order.
    TieBreakCategory => {
        Goals = "goals",
        Assists = "assists",
        CleanSheets = "clean_sheets",
        Appearances = "appearances",
    }
);

impl TieBreakCategory {
    /// Value of this criterion in `rec`.
    pub fn value_of(self, rec: &TieBreakerRecord) -> u32 {
        match self {
            TieBreakCategory::Goals => rec.goals,
            TieBreakCategory::Assists => rec.assists,
            TieBreakCategory::CleanSheets => rec.clean_sheets,
            TieBreakCategory::Appearances => rec.appearances,
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                               Voting window                                */
/* -------------------------------------------------------------------------- */

/// Invariant: `anchor <= vote_end <= announce_end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub anchor: DateTime<Utc>,
    pub vote_end: DateTime<Utc>,
    pub announce_end: DateTime<Utc>,
}

serde_enum!(
    /// Voting process phase reported by the window clock.
    Phase => {
        Hidden = "hidden",
        Pending = "pending",
        Vote = "vote",
        Announce = "announce",
        Closed = "closed",
    }
);

impl Phase {
    /// Awards are finalized only once voting has ended.
    pub fn is_final(self) -> bool {
        matches!(self, Phase::Announce | Phase::Closed)
    }
}

/* -------------------------------------------------------------------------- */
/*                              Winner decision                               */
/* -------------------------------------------------------------------------- */

/// Outcome of the winner resolver. `Multiple` always holds two or more teams.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "teams", rename_all = "snake_case")]
pub enum WinnerDecision {
    Single(TeamIndex),
    Multiple(BTreeSet<TeamIndex>),
    Indeterminate,
}

impl WinnerDecision {
    /// Collapse a winner set: empty → `Indeterminate`, one → `Single`.
    pub fn from_set(set: BTreeSet<TeamIndex>) -> Self {
        match set.len() {
            0 => WinnerDecision::Indeterminate,
            1 => set
                .into_iter()
                .next()
                .map_or(WinnerDecision::Indeterminate, WinnerDecision::Single),
            _ => WinnerDecision::Multiple(set),
        }
    }

    /// Winning team indices, ascending.
    pub fn winners(&self) -> Vec<TeamIndex> {
        match self {
            WinnerDecision::Single(t) => vec![*t],
            WinnerDecision::Multiple(set) => set.iter().copied().collect(),
            WinnerDecision::Indeterminate => Vec::new(),
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, WinnerDecision::Indeterminate)
    }
}
