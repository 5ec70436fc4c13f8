//! AGGREGATE stage: cross-match award counts and team wins.
//!
//! Every credited winner of a match counts once, including each member of a
//! multi-winner set. Matches needing manual adjudication contribute nothing
//! and are listed in `manual_pending`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use md_core::determinism::sort_stable;
use md_core::{MatchId, PlayerId, SeasonKey};

use crate::evaluate::MatchEvaluation;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardsSummary {
    pub overall: BTreeMap<PlayerId, u64>,
    pub by_season: BTreeMap<SeasonKey, BTreeMap<PlayerId, u64>>,
    /// Per season, matches won by team name. Indeterminate outcomes count for nobody.
    pub team_wins: BTreeMap<SeasonKey, BTreeMap<String, u64>>,
    pub manual_pending: Vec<MatchId>,
    /// Matches that credited at least one winner.
    pub counted_matches: u64,
    /// Matches that credited nobody (not final, no votes, or manual pending).
    pub skipped_matches: u64,
}

pub fn aggregate(evals: &[MatchEvaluation]) -> AwardsSummary {
    let mut s = AwardsSummary::default();

    for e in evals {
        for team in &e.outcome.winners {
            *s.team_wins
                .entry(e.season.clone())
                .or_default()
                .entry(team.clone())
                .or_insert(0) += 1;
        }

        if e.award.needs_manual() {
            s.manual_pending.push(e.match_id.clone());
        }

        let winners = e.award.counted_winners();
        if winners.is_empty() {
            s.skipped_matches += 1;
            continue;
        }
        s.counted_matches += 1;
        let season = s.by_season.entry(e.season.clone()).or_default();
        for p in winners {
            *season.entry(p.clone()).or_insert(0) += 1;
            *s.overall.entry(p.clone()).or_insert(0) += 1;
        }
    }

    sort_stable(&mut s.manual_pending);
    s
}
