//! Per-match award decision: override, phase gate, tally, tie-break cascade.

use serde::{Deserialize, Serialize};

use md_algo::{resolve_tie, VoteTally};
use md_core::{Phase, PlayerId, TieBreakCategory};
use md_io::loader::MatchRecord;

/// Award state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AwardDecision {
    /// Voting has not ended and no override is recorded.
    NotFinal,
    /// Voting ended without a single attributed vote.
    NoVotes,
    /// A manual winner was recorded; counts regardless of phase.
    Overridden { winners: Vec<PlayerId> },
    Resolved {
        winners: Vec<PlayerId>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        category: Option<TieBreakCategory>,
    },
    /// Irreducible tie; a human decides.
    NeedsManual { candidates: Vec<PlayerId> },
}

impl AwardDecision {
    /// Players credited with the award for this match.
    pub fn counted_winners(&self) -> &[PlayerId] {
        match self {
            AwardDecision::Overridden { winners } | AwardDecision::Resolved { winners, .. } => winners,
            _ => &[],
        }
    }

    pub fn needs_manual(&self) -> bool {
        matches!(self, AwardDecision::NeedsManual { .. })
    }
}

pub fn decide_award(m: &MatchRecord, phase: Phase, tally: &VoteTally) -> AwardDecision {
    if !m.manual_winner.is_empty() {
        return AwardDecision::Overridden { winners: m.manual_winner.clone() };
    }
    if !phase.is_final() {
        return AwardDecision::NotFinal;
    }
    if tally.leaders.is_empty() {
        return AwardDecision::NoVotes;
    }

    let out = resolve_tie(&tally.leaders, &m.tie_breakers);
    if out.requires_manual {
        tracing::debug!(match_id = %m.id, candidates = out.winners.len(), "award needs manual adjudication");
        AwardDecision::NeedsManual { candidates: out.winners }
    } else {
        AwardDecision::Resolved { winners: out.winners, category: out.category }
    }
}
