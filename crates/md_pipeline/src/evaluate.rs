//! EVALUATE stage: outcome, phase, tally and award for a single match.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use md_algo::{resolve_winner, tally, voting_phase, voting_window, MatchTiming, VoteTally};
use md_core::{MatchId, Params, Phase, PlayerId, SeasonKey, VotingWindow, WinnerDecision};
use md_io::loader::MatchRecord;

use crate::award::{decide_award, AwardDecision};

/// Winner decision plus the display names of the winning teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeView {
    pub decision: WinnerDecision,
    pub winners: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySummary {
    pub total: u64,
    pub max_count: u64,
    pub counts: BTreeMap<PlayerId, u64>,
    pub unattributed: u64,
    pub leaders: Vec<PlayerId>,
}

impl From<&VoteTally> for TallySummary {
    fn from(t: &VoteTally) -> Self {
        Self {
            total: t.total,
            max_count: t.max_count,
            counts: t.counts.clone(),
            unattributed: t.unattributed(),
            leaders: t.leaders.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvaluation {
    pub match_id: MatchId,
    pub season: SeasonKey,
    pub scheduled_at: DateTime<Utc>,
    pub outcome: OutcomeView,
    pub phase: Phase,
    /// Omitted while the match is hidden.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window: Option<VotingWindow>,
    pub tally: TallySummary,
    pub award: AwardDecision,
}

pub fn timing_of(m: &MatchRecord) -> MatchTiming {
    MatchTiming {
        anchor: m.scheduled_at,
        requires_manual_activation: m.requires_manual_activation,
        manually_opened: m.voting_opened,
        has_score_data: m.scores.has_score_data(),
    }
}

pub fn evaluate_match(m: &MatchRecord, params: &Params, now: DateTime<Utc>) -> MatchEvaluation {
    let decision = resolve_winner(&m.scores, m.fields.as_ref());
    let winners: Vec<String> = decision.winners().into_iter().map(|t| m.team_name(t)).collect();

    let phase = voting_phase(&timing_of(m), params, now);
    let window = (phase != Phase::Hidden).then(|| voting_window(m.scheduled_at, params));

    let t = tally(&m.votes);
    let award = decide_award(m, phase, &t);

    tracing::debug!(
        match_id = %m.id,
        phase = %phase,
        votes = t.total,
        award = ?award,
        "match evaluated"
    );

    MatchEvaluation {
        match_id: m.id.clone(),
        season: m.season.clone(),
        scheduled_at: m.scheduled_at,
        outcome: OutcomeView { decision, winners },
        phase,
        window,
        tally: TallySummary::from(&t),
        award,
    }
}
