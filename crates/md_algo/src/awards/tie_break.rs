//! Tie-break cascade over performance records.
//!
//! Criteria are applied in the order of [`CASCADE`]. A criterion whose maximum
//! among the remaining candidates is 0 does not narrow the set. As soon as one
//! candidate remains it wins, tagged with the deciding criterion. An exhausted
//! cascade returns the remaining set with `requires_manual = true`; no
//! arbitrary final ordering is applied.

use std::collections::{BTreeMap, BTreeSet};

use md_core::{PlayerId, TieBreakCategory, TieBreakerRecord};

/// Cascade order. Adding a criterion is a one-line change here.
pub const CASCADE: [TieBreakCategory; 4] = [
    TieBreakCategory::Goals,
    TieBreakCategory::Assists,
    TieBreakCategory::CleanSheets,
    TieBreakCategory::Appearances,
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TieBreakOutcome {
    pub winners: Vec<PlayerId>,
    /// Deciding criterion; `None` when no cascade step was needed or none decided.
    pub category: Option<TieBreakCategory>,
    pub requires_manual: bool,
}

/// Resolve a leader set. Missing records count as all-zero.
pub fn resolve_tie(
    leaders: &[PlayerId],
    records: &BTreeMap<PlayerId, TieBreakerRecord>,
) -> TieBreakOutcome {
    // Dedup while keeping caller order.
    let mut seen = BTreeSet::new();
    let start: Vec<PlayerId> = leaders.iter().filter(|p| seen.insert(*p)).cloned().collect();

    if start.len() <= 1 {
        return TieBreakOutcome { winners: start, category: None, requires_manual: false };
    }

    let value = |p: &PlayerId, cat: TieBreakCategory| -> u32 {
        records.get(p).map_or(0, |r| cat.value_of(r))
    };

    let remaining = CASCADE.iter().try_fold(start, |cands, &cat| {
        let max = cands.iter().map(|p| value(p, cat)).max().unwrap_or(0);
        if max == 0 {
            tracing::trace!(criterion = %cat, "tie-break criterion non-discriminating");
            return Ok(cands);
        }
        let narrowed: Vec<PlayerId> = cands.into_iter().filter(|p| value(p, cat) == max).collect();
        if narrowed.len() == 1 {
            Err((narrowed, cat))
        } else {
            Ok(narrowed)
        }
    });

    match remaining {
        Err((winners, cat)) => TieBreakOutcome { winners, category: Some(cat), requires_manual: false },
        Ok(winners) => {
            tracing::debug!(candidates = winners.len(), "tie-break cascade exhausted; manual adjudication required");
            TieBreakOutcome { winners, category: None, requires_manual: true }
        }
    }
}
