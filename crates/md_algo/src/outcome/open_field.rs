//! Four-plus teams on a single field: best single-game differential.
//!
//! For every game a team played, its differential is its score minus the
//! average of the other recorded scores in that game. A team's rating is its
//! best such differential; the highest rating wins, ties are `Indeterminate`.
//!
//! Averages are kept as exact `Ratio`s so that ties are real ties.

use std::collections::BTreeMap;

use md_core::rounding::{new_ratio_checked, Ratio};
use md_core::{ScoreMatrix, TeamIndex, WinnerDecision};

/// Best single-game differential per team. Teams that never played alongside
/// at least one opponent are absent.
pub fn best_differentials(m: &ScoreMatrix) -> BTreeMap<TeamIndex, Ratio> {
    let mut best: BTreeMap<TeamIndex, Ratio> = BTreeMap::new();

    for g in 0..m.game_count() {
        let parts = m.participants(g);
        if parts.len() < 2 {
            continue;
        }
        let opponents = (parts.len() - 1) as i128;
        let sum: i128 = parts
            .iter()
            .map(|&t| i128::from(m.score(g, t).unwrap_or(0)))
            .sum();

        for &t in &parts {
            let own = i128::from(m.score(g, t).unwrap_or(0));
            // own − (sum − own)/k  ==  (own·k − (sum − own)) / k
            let Ok(diff) = new_ratio_checked(own * opponents - (sum - own), opponents) else {
                continue;
            };
            best.entry(t)
                .and_modify(|cur| {
                    if diff > *cur {
                        *cur = diff;
                    }
                })
                .or_insert(diff);
        }
    }
    best
}

/// Resolve a single-field match with four or more teams.
pub fn resolve_open_field(m: &ScoreMatrix) -> WinnerDecision {
    let best = best_differentials(m);
    let Some(max) = best.values().max().copied() else {
        return WinnerDecision::Indeterminate;
    };
    let mut leaders = best.iter().filter(|(_, d)| **d == max).map(|(t, _)| *t);
    match (leaders.next(), leaders.next()) {
        (Some(t), None) => WinnerDecision::Single(t),
        _ => WinnerDecision::Indeterminate,
    }
}
