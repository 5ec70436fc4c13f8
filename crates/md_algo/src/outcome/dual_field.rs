//! Dual-field matches: two disjoint team pools playing simultaneous round robins.
//!
//! Separation is valid only when the two fields' team sets are disjoint, each
//! field has at least two teams, and together they cover every team. Each
//! field is resolved independently with the round-robin table and the winners
//! are united into one multi-winner decision.

use std::collections::BTreeSet;

use md_core::{FieldAssignment, ScoreMatrix, TeamIndex, WinnerDecision};

use super::round_robin::{resolve_round_robin, PairGame};

/// Validated split of the match's teams across the two fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSplit {
    pub first: BTreeSet<TeamIndex>,
    pub second: BTreeSet<TeamIndex>,
}

/// Why a field assignment cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldSplitError {
    /// No pairings at all.
    Empty,
    /// Some team appears on both fields during the match.
    Overlap,
    /// A field hosts fewer than two teams.
    TooFewTeams,
    /// Some team never appears on either field.
    Uncovered,
    /// A game puts other than two teams on one field.
    NotAPair,
}

/// In-range members of a field group; out-of-range indices are dropped.
fn in_range(group: &[TeamIndex], team_count: usize) -> Vec<TeamIndex> {
    let kept: Vec<TeamIndex> = group.iter().copied().filter(|&t| t < team_count).collect();
    if kept.len() != group.len() {
        tracing::warn!(?group, team_count, "field group references unknown team index; dropped");
    }
    kept
}

/// Check that the assignment splits `team_count` teams into two valid pools.
pub fn check_field_separation(
    fa: &FieldAssignment,
    team_count: usize,
) -> Result<FieldSplit, FieldSplitError> {
    if fa.is_empty() {
        return Err(FieldSplitError::Empty);
    }

    let mut first: BTreeSet<TeamIndex> = BTreeSet::new();
    let mut second: BTreeSet<TeamIndex> = BTreeSet::new();
    for pairing in &fa.games {
        first.extend(in_range(&pairing.first, team_count));
        second.extend(in_range(&pairing.second, team_count));
    }

    if !first.is_disjoint(&second) {
        return Err(FieldSplitError::Overlap);
    }
    if first.len() < 2 || second.len() < 2 {
        return Err(FieldSplitError::TooFewTeams);
    }
    if first.len() + second.len() != team_count {
        return Err(FieldSplitError::Uncovered);
    }
    // An empty group is an idle field for that game.
    let paired = |group: &[TeamIndex]| matches!(in_range(group, team_count).len(), 0 | 2);
    if !fa.games.iter().all(|p| paired(&p.first) && paired(&p.second)) {
        return Err(FieldSplitError::NotAPair);
    }
    Ok(FieldSplit { first, second })
}

#[derive(Clone, Copy)]
enum Field {
    First,
    Second,
}

/// Pair games played on one field. Idle (empty) groups are skipped.
fn field_games(m: &ScoreMatrix, fa: &FieldAssignment, field: Field) -> Vec<PairGame> {
    let mut out = Vec::new();
    for (g, pairing) in fa.games.iter().enumerate().take(m.game_count()) {
        let group = match field {
            Field::First => &pairing.first,
            Field::Second => &pairing.second,
        };
        let kept = in_range(group, m.team_count());
        let &[home, away] = kept.as_slice() else {
            continue;
        };
        let (hs, aw) = (m.score(g, home), m.score(g, away));
        if hs.is_none() && aw.is_none() {
            continue;
        }
        out.push(PairGame {
            home,
            away,
            home_score: hs.unwrap_or(0),
            away_score: aw.unwrap_or(0),
        });
    }
    out
}

/// Resolve each field independently and unite the winners.
///
/// The split must come from [`check_field_separation`]; a field that ends
/// level contributes no winner.
pub fn resolve_dual_field(m: &ScoreMatrix, fa: &FieldAssignment, split: &FieldSplit) -> WinnerDecision {
    let mut winners: BTreeSet<TeamIndex> = BTreeSet::new();
    for (field, pool) in [(Field::First, &split.first), (Field::Second, &split.second)] {
        let decision = resolve_round_robin(&field_games(m, fa, field));
        for t in decision.winners() {
            if pool.contains(&t) {
                winners.insert(t);
            }
        }
    }
    WinnerDecision::from_set(winners)
}
