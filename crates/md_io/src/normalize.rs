//! Legacy score shapes → canonical `ScoreMatrix`.
//!
//! Match records carry scores in several historical shapes. `detect_shape`
//! picks the first marker present, in priority order:
//!
//! 1. `score_matrix` | `quarter_scores` | `game_scores`: per-game rows
//! 2. `home_score` + `away_score` (or `team_a_score` + `team_b_score`): one game
//! 3. `games`: objects with `scores`|`score` and optional `teams`|`team_indices`
//! 4. `scores` | `score`: one aggregate row
//!
//! Each shape has its own converter into raw cells; all of them meet in
//! `build_matrix`. Nothing here fails: an unrecognized or empty shape yields
//! an empty matrix. New shapes are new `LegacyShape` arms.

use std::collections::BTreeSet;

use serde_json::Value;

use md_core::entities::rotation_pair;
use md_core::{FieldAssignment, FieldPairing, ScoreMatrix, TeamIndex};

const MATRIX_KEYS: [&str; 3] = ["score_matrix", "quarter_scores", "game_scores"];
const PAIR_KEYS: [(&str, &str); 2] = [("home_score", "away_score"), ("team_a_score", "team_b_score")];
const AGGREGATE_KEYS: [&str; 2] = ["scores", "score"];

/// Widest match the normalizer will lay out. Larger declared counts are
/// ignored and cells at or beyond this index are dropped.
pub const MAX_TEAMS: usize = 64;

/// Recognized score shape of a match record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LegacyShape<'a> {
    Matrix(&'a [Value]),
    Pair(&'a Value, &'a Value),
    Games(&'a [Value]),
    Aggregate(&'a [Value]),
    Unrecognized,
}

impl LegacyShape<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            LegacyShape::Matrix(_) => "matrix",
            LegacyShape::Pair(..) => "pair",
            LegacyShape::Games(_) => "games",
            LegacyShape::Aggregate(_) => "aggregate",
            LegacyShape::Unrecognized => "unrecognized",
        }
    }
}

/// Non-empty array under `key`, if any.
fn non_empty_array<'a>(record: &'a Value, key: &str) -> Option<&'a [Value]> {
    match record.get(key) {
        Some(Value::Array(a)) if !a.is_empty() => Some(a.as_slice()),
        _ => None,
    }
}

fn present<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

pub fn detect_shape(record: &Value) -> LegacyShape<'_> {
    if let Some(rows) = MATRIX_KEYS.iter().find_map(|k| non_empty_array(record, k)) {
        return LegacyShape::Matrix(rows);
    }
    for (a, b) in PAIR_KEYS {
        if let (Some(x), Some(y)) = (present(record, a), present(record, b)) {
            return LegacyShape::Pair(x, y);
        }
    }
    if let Some(games) = non_empty_array(record, "games") {
        return LegacyShape::Games(games);
    }
    if let Some(row) = AGGREGATE_KEYS.iter().find_map(|k| non_empty_array(record, k)) {
        return LegacyShape::Aggregate(row);
    }
    LegacyShape::Unrecognized
}

/// Lenient non-negative integer: JSON number or numeric string.
/// Negatives, fractions and garbage are absent.
pub fn as_count(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f as u32)
            }
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn as_index(v: &Value) -> Option<TeamIndex> {
    as_count(v).map(|u| u as TeamIndex)
}

/// One game before placement: `(team, score)` cells plus whether the team
/// indices were given explicitly.
#[derive(Debug, Default)]
struct RawGame {
    cells: Vec<(TeamIndex, Option<u32>)>,
    remapped: bool,
}

impl RawGame {
    fn positional(row: &[Value]) -> Self {
        Self { cells: row.iter().map(as_count).enumerate().collect(), remapped: false }
    }

    fn from_value(v: &Value) -> Self {
        match v {
            Value::Array(row) => Self::positional(row),
            Value::Object(_) => {
                let scores = AGGREGATE_KEYS
                    .iter()
                    .find_map(|k| v.get(*k).and_then(Value::as_array));
                let teams = ["teams", "team_indices"]
                    .iter()
                    .find_map(|k| v.get(*k).and_then(Value::as_array));
                match (scores, teams) {
                    (Some(s), Some(t)) => Self {
                        cells: t
                            .iter()
                            .zip(s)
                            .filter_map(|(ti, sc)| as_index(ti).map(|i| (i, as_count(sc))))
                            .collect(),
                        remapped: true,
                    },
                    (Some(s), None) => Self::positional(s),
                    _ => Self::default(),
                }
            }
            _ => Self::default(),
        }
    }
}

fn raw_games(shape: LegacyShape<'_>) -> Vec<RawGame> {
    match shape {
        LegacyShape::Matrix(rows) | LegacyShape::Games(rows) => rows.iter().map(RawGame::from_value).collect(),
        LegacyShape::Pair(a, b) => vec![RawGame {
            cells: vec![(0, as_count(a)), (1, as_count(b))],
            remapped: false,
        }],
        LegacyShape::Aggregate(row) => vec![RawGame::positional(row)],
        LegacyShape::Unrecognized => Vec::new(),
    }
}

/// Declared team count: `team_count`, else the length of `teams`.
/// Counts above [`MAX_TEAMS`] are treated as absent.
pub fn declared_team_count(record: &Value) -> Option<usize> {
    let within = |n: &usize| (1..=MAX_TEAMS).contains(n);
    if let Some(n) = record.get("team_count").and_then(as_index) {
        if within(&n) {
            return Some(n);
        }
        tracing::warn!(team_count = n, max = MAX_TEAMS, "declared team_count out of range; inferring from rows");
    }
    record.get("teams").and_then(Value::as_array).map(Vec::len).filter(within)
}

fn build_matrix(games: Vec<RawGame>, declared: Option<usize>) -> ScoreMatrix {
    let inferred = games
        .iter()
        .flat_map(|g| g.cells.iter().map(|(t, _)| t + 1))
        .filter(|n| *n <= MAX_TEAMS)
        .max()
        .unwrap_or(0);
    let team_count = declared.unwrap_or(inferred);
    if team_count == 0 {
        return ScoreMatrix::empty();
    }

    let mut dropped = 0usize;
    let rows = games
        .into_iter()
        .enumerate()
        .map(|(g, game)| {
            let mut row: Vec<Option<u32>> = vec![None; team_count];
            let onto_rotation = team_count == 3 && !game.remapped && game.cells.len() == 2;
            for (pos, (t, score)) in game.cells.into_iter().enumerate() {
                let t = if onto_rotation {
                    let (a, b) = rotation_pair(g);
                    if pos == 0 { a } else { b }
                } else {
                    t
                };
                match row.get_mut(t) {
                    Some(slot) => *slot = score,
                    None => dropped += 1,
                }
            }
            row
        })
        .collect();

    if dropped > 0 {
        tracing::warn!(dropped, team_count, "score cells reference unknown team index; dropped");
    }
    ScoreMatrix::new(team_count, rows)
}

/// Normalize a match record's scores. Never fails.
pub fn normalize_scores(record: &Value) -> ScoreMatrix {
    let shape = detect_shape(record);
    tracing::debug!(shape = shape.name(), "score shape detected");
    let m = build_matrix(raw_games(shape), declared_team_count(record));
    if m.is_empty() {
        ScoreMatrix::empty()
    } else {
        m
    }
}

fn index_group(v: &Value) -> Vec<TeamIndex> {
    v.as_array()
        .map(|a| a.iter().filter_map(as_index).collect::<BTreeSet<_>>().into_iter().collect())
        .unwrap_or_default()
}

/// Normalize `field_assignment` (alias `fields`).
///
/// Each game entry is either `[[a, b], [c, d]]` or `{"first": [..], "second": [..]}`.
/// Returns `None` when no usable pairing is present. Index range is checked by
/// the resolver, which knows the team count.
pub fn normalize_fields(record: &Value) -> Option<FieldAssignment> {
    let entries = non_empty_array(record, "field_assignment").or_else(|| non_empty_array(record, "fields"))?;
    let games: Vec<FieldPairing> = entries
        .iter()
        .filter_map(|e| match e {
            Value::Array(pair) if pair.len() == 2 => Some(FieldPairing {
                first: index_group(&pair[0]),
                second: index_group(&pair[1]),
            }),
            Value::Object(_) => Some(FieldPairing {
                first: e.get("first").map(index_group).unwrap_or_default(),
                second: e.get("second").map(index_group).unwrap_or_default(),
            }),
            _ => None,
        })
        .collect();
    let fa = FieldAssignment { games };
    if fa.is_empty() {
        None
    } else {
        Some(fa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(m: &ScoreMatrix) -> Vec<Vec<Option<u32>>> {
        m.games().to_vec()
    }

    #[test]
    fn matrix_has_priority() {
        let rec = json!({"score_matrix": [[5, 3], [2, 1]], "home_score": 9, "away_score": 0});
        assert!(matches!(detect_shape(&rec), LegacyShape::Matrix(_)));
        let m = normalize_scores(&rec);
        assert_eq!(m.team_count(), 2);
        assert_eq!(rows(&m), vec![vec![Some(5), Some(3)], vec![Some(2), Some(1)]]);
    }

    #[test]
    fn pair_shape_is_one_game() {
        let m = normalize_scores(&json!({"team_a_score": "4", "team_b_score": 2}));
        assert_eq!(rows(&m), vec![vec![Some(4), Some(2)]]);
    }

    #[test]
    fn games_with_remap() {
        let rec = json!({
            "team_count": 4,
            "games": [
                {"scores": [2, 1], "teams": [0, 3]},
                {"score": [0, 0], "team_indices": [1, 2]}
            ]
        });
        let m = normalize_scores(&rec);
        assert_eq!(m.team_count(), 4);
        assert_eq!(
            rows(&m),
            vec![
                vec![Some(2), None, None, Some(1)],
                vec![None, Some(0), Some(0), None],
            ]
        );
    }

    #[test]
    fn aggregate_is_lowest_priority() {
        let rec = json!({"scores": [3, 1, 2]});
        assert!(matches!(detect_shape(&rec), LegacyShape::Aggregate(_)));
        assert_eq!(rows(&normalize_scores(&rec)), vec![vec![Some(3), Some(1), Some(2)]]);
    }

    #[test]
    fn three_team_two_wide_rows_follow_rotation() {
        let rec = json!({"teams": ["A", "B", "C"], "quarter_scores": [[1, 0], [2, 2], [0, 3]]});
        let m = normalize_scores(&rec);
        assert_eq!(
            rows(&m),
            vec![
                vec![Some(1), Some(0), None],
                vec![None, Some(2), Some(2)],
                vec![Some(0), None, Some(3)],
            ]
        );
    }

    #[test]
    fn unrecognized_and_empty_yield_empty_matrix() {
        assert!(normalize_scores(&json!({"id": "m1"})).is_empty());
        assert!(normalize_scores(&json!({"score_matrix": []})).is_empty());
        assert!(normalize_scores(&json!({"team_count": 2, "scores": [null, "x"]})).is_empty());
        assert_eq!(normalize_scores(&json!(null)), ScoreMatrix::empty());
    }

    #[test]
    fn lenient_counts() {
        assert_eq!(as_count(&json!(3)), Some(3));
        assert_eq!(as_count(&json!(" 7 ")), Some(7));
        assert_eq!(as_count(&json!(2.0)), Some(2));
        assert_eq!(as_count(&json!(-1)), None);
        assert_eq!(as_count(&json!(1.5)), None);
        assert_eq!(as_count(&json!("abc")), None);
    }

    #[test]
    fn out_of_range_cells_are_dropped() {
        let m = normalize_scores(&json!({"team_count": 2, "score_matrix": [[1, 2, 9]]}));
        assert_eq!(rows(&m), vec![vec![Some(1), Some(2)]]);
    }

    #[test]
    fn huge_team_indices_are_capped() {
        let m = normalize_scores(&json!({"games": [{"scores": [1, 2], "teams": [0, 4000000000u64]}]}));
        assert_eq!(m.team_count(), 1);
        assert_eq!(rows(&m), vec![vec![Some(1)]]);

        let m = normalize_scores(&json!({"team_count": 4000000000u64, "score_matrix": [[3, 1]]}));
        assert_eq!(m.team_count(), 2);
        assert_eq!(rows(&m), vec![vec![Some(3), Some(1)]]);

        let rec = json!({"team_count": MAX_TEAMS + 1, "games": [{"scores": [5], "teams": [MAX_TEAMS]}]});
        assert!(normalize_scores(&rec).is_empty());
    }

    #[test]
    fn field_assignment_shapes() {
        let fa = normalize_fields(&json!({"field_assignment": [[[0, 1], [2, 3]]]})).unwrap();
        assert_eq!(fa.games, vec![FieldPairing { first: vec![0, 1], second: vec![2, 3] }]);
        let fa = normalize_fields(&json!({"fields": [{"first": [1, 0], "second": ["3", 2]}]})).unwrap();
        assert_eq!(fa.games[0].first, vec![0, 1]);
        assert_eq!(fa.games[0].second, vec![2, 3]);
        assert!(normalize_fields(&json!({"fields": []})).is_none());
    }
}
