//! Round-robin points table (3 / 1 / 0) with best-N weighting.
//!
//! Used directly for three-team pods and per field for dual-field matches.
//!
//! Resolution:
//! 1. Only teams with at least one game are contenders.
//! 2. Equal games played → highest total points; any tie at the top is `Indeterminate`.
//! 3. Unequal games played → each contender keeps its best N game results,
//!    N = fewest games played by any contender. A two-way tie on those weighted
//!    points goes to head-to-head points, then head-to-head score differential.
//!    Anything still level (or a three-way tie) is `Indeterminate`.
//!
//! The best-N rule is preserved exactly as historical results depend on it.

use core::cmp::Ordering;
use std::collections::BTreeMap;

use md_core::entities::rotation_pair;
use md_core::{ScoreMatrix, TeamIndex, WinnerDecision};

pub const POINTS_WIN: u32 = 3;
pub const POINTS_DRAW: u32 = 1;
pub const POINTS_LOSS: u32 = 0;

/// One game between exactly two teams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairGame {
    pub home: TeamIndex,
    pub away: TeamIndex,
    pub home_score: u32,
    pub away_score: u32,
}

impl PairGame {
    /// Points earned by (home, away).
    pub fn points(&self) -> (u32, u32) {
        match self.home_score.cmp(&self.away_score) {
            Ordering::Greater => (POINTS_WIN, POINTS_LOSS),
            Ordering::Less => (POINTS_LOSS, POINTS_WIN),
            Ordering::Equal => (POINTS_DRAW, POINTS_DRAW),
        }
    }

    fn involves(&self, a: TeamIndex, b: TeamIndex) -> bool {
        (self.home == a && self.away == b) || (self.home == b && self.away == a)
    }
}

/// Per-team accumulation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeamRecord {
    /// Points earned in each game, in play order.
    pub game_points: Vec<u32>,
}

impl TeamRecord {
    pub fn games(&self) -> usize {
        self.game_points.len()
    }

    pub fn points(&self) -> u32 {
        self.game_points.iter().sum()
    }

    /// Sum of the best `n` game results.
    pub fn best_n_points(&self, n: usize) -> u32 {
        let mut pts = self.game_points.clone();
        pts.sort_unstable_by(|a, b| b.cmp(a));
        pts.into_iter().take(n).sum()
    }
}

/// Points table over a list of pair games.
#[derive(Clone, Debug, Default)]
pub struct RoundRobinTable {
    records: BTreeMap<TeamIndex, TeamRecord>,
    games: Vec<PairGame>,
}

impl RoundRobinTable {
    pub fn build(games: &[PairGame]) -> Self {
        let mut records: BTreeMap<TeamIndex, TeamRecord> = BTreeMap::new();
        for g in games {
            let (ph, pa) = g.points();
            records.entry(g.home).or_default().game_points.push(ph);
            records.entry(g.away).or_default().game_points.push(pa);
        }
        Self { records, games: games.to_vec() }
    }

    pub fn records(&self) -> &BTreeMap<TeamIndex, TeamRecord> {
        &self.records
    }

    /// True when every contender played the same number of games.
    pub fn games_are_equal(&self) -> bool {
        let mut it = self.records.values().map(TeamRecord::games);
        match it.next() {
            Some(first) => it.all(|n| n == first),
            None => true,
        }
    }

    /// Fewest games played by any contender.
    pub fn min_games(&self) -> usize {
        self.records.values().map(TeamRecord::games).min().unwrap_or(0)
    }

    /// Head-to-head (points a, points b, score differential a − b) over games between `a` and `b`.
    pub fn head_to_head(&self, a: TeamIndex, b: TeamIndex) -> (u32, u32, i64) {
        let mut pa = 0u32;
        let mut pb = 0u32;
        let mut diff = 0i64;
        for g in self.games.iter().filter(|g| g.involves(a, b)) {
            let (ph, pw) = g.points();
            let d = i64::from(g.home_score) - i64::from(g.away_score);
            if g.home == a {
                pa += ph;
                pb += pw;
                diff += d;
            } else {
                pa += pw;
                pb += ph;
                diff -= d;
            }
        }
        (pa, pb, diff)
    }
}

/// Teams holding the maximum of `key` across contenders.
fn top_by<F: Fn(&TeamRecord) -> u32>(table: &RoundRobinTable, key: F) -> Vec<TeamIndex> {
    let max = table.records.values().map(&key).max().unwrap_or(0);
    table
        .records
        .iter()
        .filter(|(_, r)| key(r) == max)
        .map(|(t, _)| *t)
        .collect()
}

/// Resolve a round robin over explicit pair games.
pub fn resolve_round_robin(games: &[PairGame]) -> WinnerDecision {
    let table = RoundRobinTable::build(games);
    if table.records.is_empty() {
        return WinnerDecision::Indeterminate;
    }

    if table.games_are_equal() {
        let leaders = top_by(&table, TeamRecord::points);
        return match leaders.as_slice() {
            [only] => WinnerDecision::Single(*only),
            _ => WinnerDecision::Indeterminate,
        };
    }

    let n = table.min_games();
    tracing::trace!(best_n = n, "round robin: unequal games played, weighting best results");
    let leaders = top_by(&table, |r| r.best_n_points(n));
    match leaders.as_slice() {
        [only] => WinnerDecision::Single(*only),
        [a, b] => {
            let (pa, pb, diff) = table.head_to_head(*a, *b);
            match pa.cmp(&pb).then(diff.cmp(&0)) {
                Ordering::Greater => WinnerDecision::Single(*a),
                Ordering::Less => WinnerDecision::Single(*b),
                Ordering::Equal => WinnerDecision::Indeterminate,
            }
        }
        _ => WinnerDecision::Indeterminate,
    }
}

/// Extract pair games for a three-team pod.
///
/// A game with exactly two recorded teams is played by those two; a game with
/// three recorded scores is read through the fixed rotation `{0,1},{1,2},{0,2}`.
/// Games with fewer than two recorded teams are skipped.
pub fn three_team_games(m: &ScoreMatrix) -> Vec<PairGame> {
    let mut out = Vec::with_capacity(m.game_count());
    for g in 0..m.game_count() {
        let parts = m.participants(g);
        let (home, away) = match parts.as_slice() {
            [a, b] => (*a, *b),
            p if p.len() > 2 => rotation_pair(g),
            _ => continue,
        };
        out.push(PairGame {
            home,
            away,
            home_score: m.score(g, home).unwrap_or(0),
            away_score: m.score(g, away).unwrap_or(0),
        });
    }
    out
}
