//! Vote tally: per-candidate counts and the raw leader set.
//!
//! A vote without a candidate is counted toward `total` but toward no
//! candidate, so callers can spot malformed input without losing the denominator.

use std::collections::BTreeMap;

use md_core::{PlayerId, Vote};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteTally {
    pub counts: BTreeMap<PlayerId, u64>,
    pub total: u64,
    pub max_count: u64,
    /// Candidates at `max_count`, in stable order; empty when `max_count == 0`.
    pub leaders: Vec<PlayerId>,
}

impl VoteTally {
    /// Votes counted in `total` but attributed to nobody.
    pub fn unattributed(&self) -> u64 {
        let attributed: u64 = self.counts.values().sum();
        self.total.saturating_sub(attributed)
    }
}

pub fn tally(votes: &[Vote]) -> VoteTally {
    let mut counts: BTreeMap<PlayerId, u64> = BTreeMap::new();
    for v in votes {
        if let Some(c) = &v.candidate {
            *counts.entry(c.clone()).or_insert(0) += 1;
        }
    }

    let max_count = counts.values().copied().max().unwrap_or(0);
    let leaders = if max_count == 0 {
        Vec::new()
    } else {
        counts
            .iter()
            .filter(|(_, &n)| n == max_count)
            .map(|(p, _)| p.clone())
            .collect()
    };

    VoteTally { counts, total: votes.len() as u64, max_count, leaders }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(c: &str) -> Vote {
        Vote::for_candidate(c.parse().unwrap())
    }

    fn names(ps: &[PlayerId]) -> Vec<&str> {
        ps.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn empty_tally() {
        let t = tally(&[]);
        assert_eq!(t.total, 0);
        assert!(t.leaders.is_empty());
        assert_eq!(t.max_count, 0);
    }

    #[test]
    fn single_leader() {
        let t = tally(&[v("p1"), v("p1"), v("p2")]);
        assert_eq!(t.counts.len(), 2);
        assert_eq!(t.counts[&"p1".parse().unwrap()], 2);
        assert_eq!(names(&t.leaders), vec!["p1"]);
    }

    #[test]
    fn unattributed_votes_count_in_total_only() {
        let blank = Vote { candidate: None, voter: Some("x".into()), created_at: None };
        let t = tally(&[blank.clone(), blank, v("p2")]);
        assert_eq!(t.total, 3);
        assert_eq!(t.unattributed(), 2);
        assert_eq!(t.max_count, 1);
        assert_eq!(names(&t.leaders), vec!["p2"]);
    }

    #[test]
    fn only_blank_votes_have_no_leaders() {
        let t = tally(&[Vote { candidate: None, voter: None, created_at: None }]);
        assert_eq!(t.total, 1);
        assert!(t.leaders.is_empty());
    }

    #[test]
    fn tied_leaders_in_stable_order() {
        let t = tally(&[v("p2"), v("p1")]);
        assert_eq!(names(&t.leaders), vec!["p1", "p2"]);
    }
}
