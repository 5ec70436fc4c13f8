//! Loader: read a local season bundle, normalize every match and return a
//! typed `SeasonBundle` for the pipeline. No network I/O.
//!
//! Records come from loosely-validated legacy storage, so most fields are
//! read leniently (skipped or defaulted with a `warn!`). Only a match that
//! cannot be identified or placed in time is an error.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{Map, Value};

use md_core::{
    FieldAssignment, MatchId, Params, ParamsOverride, PlayerId, ScoreMatrix, SeasonKey,
    TieBreakerRecord, Vote,
};

use crate::normalize::{as_count, normalize_fields, normalize_scores};
use crate::{hasher, looks_like_url_strict, IoError, IoResult};

/// Upper bound on bundle size.
pub const MAX_BUNDLE_BYTES: u64 = 16 * 1024 * 1024;

const CANDIDATE_KEYS: [&str; 3] = ["candidate", "player_id", "candidate_id"];

/// One match, normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub id: MatchId,
    pub season: SeasonKey,
    /// Nominal match time.
    pub scheduled_at: DateTime<Utc>,
    pub requires_manual_activation: bool,
    pub voting_opened: bool,
    /// Display names by team index; may be shorter than the matrix width.
    pub team_names: Vec<String>,
    pub scores: ScoreMatrix,
    pub fields: Option<FieldAssignment>,
    pub votes: Vec<Vote>,
    pub tie_breakers: BTreeMap<PlayerId, TieBreakerRecord>,
    /// Separately recorded override winners; empty when none.
    pub manual_winner: Vec<PlayerId>,
}

impl MatchRecord {
    /// Team display name, falling back to `team-<i>`.
    pub fn team_name(&self, idx: usize) -> String {
        self.team_names.get(idx).cloned().unwrap_or_else(|| format!("team-{idx}"))
    }
}

/// Loaded, normalized season bundle.
#[derive(Debug, Clone)]
pub struct SeasonBundle {
    pub params: Params,
    /// Matches in ascending (scheduled_at, id) order.
    pub matches: Vec<MatchRecord>,
    /// SHA-256 of the canonical JSON of the raw bundle.
    pub input_sha256: String,
}

// ----------------------------- Orchestration -----------------------------

/// Read and parse a bundle from a local path.
pub fn load_bundle(path: &Path, overrides: &ParamsOverride) -> IoResult<SeasonBundle> {
    let v = read_json_value_with_limits(path)?;
    parse_bundle(&v, overrides)
}

/// Parse an already-read bundle value.
pub fn parse_bundle(root: &Value, overrides: &ParamsOverride) -> IoResult<SeasonBundle> {
    let obj = root
        .as_object()
        .ok_or_else(|| IoError::Bundle("bundle root must be an object".into()))?;

    let params = load_params(obj.get("params"), overrides)?;

    let raw_matches = match obj.get("matches") {
        Some(Value::Array(a)) => a.as_slice(),
        None | Some(Value::Null) => &[][..],
        Some(_) => return Err(IoError::Json { pointer: "/matches".into(), msg: "expected an array".into() }),
    };

    let mut matches = Vec::with_capacity(raw_matches.len());
    let mut seen: BTreeSet<MatchId> = BTreeSet::new();
    for (i, rec) in raw_matches.iter().enumerate() {
        let m = parse_match(i, rec, &params)?;
        if !seen.insert(m.id.clone()) {
            return Err(IoError::Bundle(format!("match {i}: duplicate id {}", m.id)));
        }
        matches.push(m);
    }

    if let Some(Value::Array(flat)) = obj.get("votes") {
        merge_flat_votes(&mut matches, flat);
    }

    matches.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then_with(|| a.id.cmp(&b.id)));

    let input_sha256 = hasher::sha256_canonical(root)?;
    tracing::debug!(matches = matches.len(), %input_sha256, "season bundle parsed");
    Ok(SeasonBundle { params, matches, input_sha256 })
}

/// Read a local JSON file, bounded to [`MAX_BUNDLE_BYTES`]. URL-like paths are rejected.
pub fn read_json_value_with_limits(path: &Path) -> IoResult<Value> {
    let shown = path.to_string_lossy();
    if looks_like_url_strict(&shown) {
        return Err(IoError::Path(format!("URL paths are not supported (offline only): {shown}")));
    }
    let f = File::open(path).map_err(|e| IoError::Path(format!("{shown}: {e}")))?;
    if f.metadata()?.len() > MAX_BUNDLE_BYTES {
        return Err(IoError::Path(format!("{shown}: exceeds {MAX_BUNDLE_BYTES} bytes")));
    }
    let mut buf = Vec::new();
    f.take(MAX_BUNDLE_BYTES + 1).read_to_end(&mut buf)?;
    if buf.len() as u64 > MAX_BUNDLE_BYTES {
        return Err(IoError::Path(format!("{shown}: exceeds {MAX_BUNDLE_BYTES} bytes")));
    }
    Ok(serde_json::from_slice(&buf)?)
}

fn load_params(raw: Option<&Value>, overrides: &ParamsOverride) -> IoResult<Params> {
    let mut params = match raw {
        None | Some(Value::Null) => Params::default(),
        Some(v) => serde_json::from_value(v.clone()).map_err(|e| IoError::Params(e.to_string()))?,
    };
    overrides.apply(&mut params);
    params.validate_domains()?;
    Ok(params)
}

// ----------------------------- Per-match parsing -----------------------------

fn get_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

/// String or integer scalar as text.
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_bool(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_u64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "true" | "1" | "yes"),
        _ => false,
    }
}

fn parse_match(i: usize, rec: &Value, params: &Params) -> IoResult<MatchRecord> {
    let obj = rec
        .as_object()
        .ok_or_else(|| IoError::Bundle(format!("match {i}: expected an object")))?;

    let id: MatchId = obj
        .get("id")
        .and_then(scalar_text)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| IoError::Bundle(format!("match {i}: missing or invalid id")))?;

    let scheduled_at = match_time(obj, params.offset())
        .ok_or_else(|| IoError::Bundle(format!("match {i} ({id}): missing or invalid scheduled time")))?;

    let season: SeasonKey = match obj.get("season").and_then(scalar_text) {
        Some(s) => s
            .parse()
            .map_err(|_| IoError::Bundle(format!("match {i} ({id}): invalid season {s:?}")))?,
        None => season_of(scheduled_at, params.offset())?,
    };

    let votes: Vec<Vote> = obj
        .get("votes")
        .and_then(Value::as_array)
        .map(|vs| vs.iter().map(|v| parse_vote(v, &id)).collect())
        .unwrap_or_default();

    Ok(MatchRecord {
        season,
        scheduled_at,
        requires_manual_activation: lenient_bool(obj.get("requires_manual_activation")),
        voting_opened: lenient_bool(obj.get("voting_opened")),
        team_names: team_names(obj),
        scores: normalize_scores(rec),
        fields: normalize_fields(rec),
        votes,
        tie_breakers: obj.get("tie_breakers").map(|v| tie_breakers(v, &id)).unwrap_or_default(),
        manual_winner: obj.get("manual_winner").map(|v| manual_winner(v, &id)).unwrap_or_default(),
        id,
    })
}

/// `scheduled_at` (RFC 3339), else `date` + optional `time` in the params offset.
fn match_time(obj: &Map<String, Value>, offset: FixedOffset) -> Option<DateTime<Utc>> {
    if let Some(s) = get_str(obj, "scheduled_at") {
        return DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(get_str(obj, "date")?, "%Y-%m-%d").ok()?;
    let time = match get_str(obj, "time") {
        Some(t) => NaiveTime::parse_from_str(t, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M"))
            .ok()?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn season_of(at: DateTime<Utc>, offset: FixedOffset) -> IoResult<SeasonKey> {
    let year = at.with_timezone(&offset).year();
    year.to_string()
        .parse()
        .map_err(|_| IoError::Bundle(format!("cannot derive season from year {year}")))
}

fn team_names(obj: &Map<String, Value>) -> Vec<String> {
    let Some(teams) = obj.get("teams").and_then(Value::as_array) else {
        return Vec::new();
    };
    teams
        .iter()
        .enumerate()
        .map(|(i, t)| match t {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Object(o) => get_str(o, "name").map(str::to_string).unwrap_or_else(|| format!("team-{i}")),
            _ => format!("team-{i}"),
        })
        .collect()
}

fn player(v: &Value) -> Option<PlayerId> {
    scalar_text(v).and_then(|s| s.parse().ok())
}

fn parse_vote(v: &Value, match_id: &MatchId) -> Vote {
    let (candidate_raw, obj) = match v {
        Value::Object(o) => (CANDIDATE_KEYS.iter().find_map(|k| o.get(*k)), Some(o)),
        other => (Some(other), None),
    };
    let candidate = candidate_raw.and_then(player);
    if candidate.is_none() && candidate_raw.and_then(scalar_text).is_some() {
        tracing::warn!(%match_id, "vote candidate is not a valid player id; counted as unattributed");
    }

    let created_at = obj.and_then(|o| get_str(o, "created_at")).and_then(|s| {
        let parsed = DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc));
        if parsed.is_none() {
            tracing::warn!(%match_id, created_at = s, "unparseable vote timestamp ignored");
        }
        parsed
    });

    Vote {
        candidate,
        voter: obj.and_then(|o| get_str(o, "voter")).map(str::to_string),
        created_at,
    }
}

fn record_of(v: &Value) -> TieBreakerRecord {
    let n = |k: &str| v.get(k).and_then(as_count).unwrap_or(0);
    TieBreakerRecord {
        goals: n("goals"),
        assists: n("assists"),
        clean_sheets: n("clean_sheets"),
        appearances: n("appearances"),
    }
}

/// Map form `{player: {...}}` or list form `[{player_id, ...}]`.
fn tie_breakers(v: &Value, match_id: &MatchId) -> BTreeMap<PlayerId, TieBreakerRecord> {
    let mut out = BTreeMap::new();
    match v {
        Value::Object(map) => {
            for (k, rec) in map {
                match k.trim().parse::<PlayerId>() {
                    Ok(p) => {
                        out.insert(p, record_of(rec));
                    }
                    Err(_) => tracing::warn!(%match_id, key = %k, "tie-breaker key is not a player id; skipped"),
                }
            }
        }
        Value::Array(list) => {
            for rec in list {
                match CANDIDATE_KEYS.iter().find_map(|k| rec.get(*k)).and_then(player) {
                    Some(p) => {
                        out.insert(p, record_of(rec));
                    }
                    None => tracing::warn!(%match_id, "tie-breaker entry without player id; skipped"),
                }
            }
        }
        _ => {}
    }
    out
}

fn manual_winner(v: &Value, match_id: &MatchId) -> Vec<PlayerId> {
    let items: Vec<&Value> = match v {
        Value::Array(a) => a.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    };
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for it in items {
        match player(it) {
            Some(p) => {
                if seen.insert(p.clone()) {
                    out.push(p);
                }
            }
            None => tracing::warn!(%match_id, "manual winner entry is not a player id; skipped"),
        }
    }
    out
}

/// Merge a flat `[{match_id, candidate, ...}]` table into the matches.
fn merge_flat_votes(matches: &mut [MatchRecord], flat: &[Value]) {
    let index: BTreeMap<MatchId, usize> =
        matches.iter().enumerate().map(|(i, m)| (m.id.clone(), i)).collect();
    let mut unknown = 0usize;
    for v in flat {
        let target = v
            .get("match_id")
            .and_then(scalar_text)
            .and_then(|s| s.parse::<MatchId>().ok())
            .and_then(|id| index.get(&id).map(|&i| (id, i)));
        match target {
            Some((id, i)) => {
                let vote = parse_vote(v, &id);
                matches[i].votes.push(vote);
            }
            None => unknown += 1,
        }
    }
    if unknown > 0 {
        tracing::warn!(skipped = unknown, "votes reference unknown matches; skipped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn parse(v: Value) -> IoResult<SeasonBundle> {
        parse_bundle(&v, &ParamsOverride::default())
    }

    #[test]
    fn minimal_bundle() {
        let b = parse(json!({
            "matches": [{
                "id": "m-001",
                "scheduled_at": "2025-03-01T10:00:00Z",
                "teams": ["Red", "Blue"],
                "score_matrix": [[5, 3], [2, 1]],
                "votes": [{"candidate": "p1"}, {"player_id": "p2", "voter": "anon"}, {}]
            }]
        }))
        .unwrap();
        assert_eq!(b.params, Params::default());
        let m = &b.matches[0];
        assert_eq!(m.season.as_str(), "2025");
        assert_eq!(m.team_name(1), "Blue");
        assert_eq!(m.team_name(5), "team-5");
        assert_eq!(m.scores.game_count(), 2);
        assert_eq!(m.votes.len(), 3);
        assert_eq!(m.votes[1].voter.as_deref(), Some("anon"));
        assert!(m.votes[2].candidate.is_none());
        assert_eq!(b.input_sha256.len(), 64);
    }

    #[test]
    fn local_date_and_time_use_offset() {
        let b = parse(json!({
            "params": {"utc_offset_minutes": 540},
            "matches": [{"id": 7, "date": "2025-01-01", "time": "08:30", "team_count": 2}]
        }))
        .unwrap();
        let m = &b.matches[0];
        assert_eq!(m.id.as_str(), "7");
        assert_eq!(m.scheduled_at, Utc.with_ymd_and_hms(2024, 12, 31, 23, 30, 0).unwrap());
        // Season follows the local calendar.
        assert_eq!(m.season.as_str(), "2025");
    }

    #[test]
    fn flat_votes_merge_and_unknown_are_skipped() {
        let b = parse(json!({
            "matches": [{"id": "a", "scheduled_at": "2025-03-01T10:00:00Z", "votes": ["p1"]}],
            "votes": [
                {"match_id": "a", "candidate_id": "p2"},
                {"match_id": "zzz", "candidate": "p3"}
            ]
        }))
        .unwrap();
        let names: Vec<_> = b.matches[0]
            .votes
            .iter()
            .map(|v| v.candidate.as_ref().map(|p| p.as_str().to_string()))
            .collect();
        assert_eq!(names, vec![Some("p1".to_string()), Some("p2".to_string())]);
    }

    #[test]
    fn tie_breakers_and_manual_winner_forms() {
        let b = parse(json!({
            "matches": [
                {
                    "id": "a", "scheduled_at": "2025-03-01T10:00:00Z",
                    "tie_breakers": {"p1": {"goals": "2", "assists": 1}, "p2": {"goals": -1}},
                    "manual_winner": "p9"
                },
                {
                    "id": "b", "scheduled_at": "2025-03-02T10:00:00Z",
                    "tie_breakers": [{"player_id": "p3", "clean_sheets": 1}],
                    "manual_winner": ["p1", "p1", ""]
                }
            ]
        }))
        .unwrap();
        let a = &b.matches[0];
        let p1: PlayerId = "p1".parse().unwrap();
        let p2: PlayerId = "p2".parse().unwrap();
        assert_eq!(a.tie_breakers[&p1], TieBreakerRecord { goals: 2, assists: 1, clean_sheets: 0, appearances: 0 });
        assert_eq!(a.tie_breakers[&p2], TieBreakerRecord::default());
        assert_eq!(a.manual_winner, vec!["p9".parse::<PlayerId>().unwrap()]);
        let m2 = &b.matches[1];
        assert_eq!(m2.tie_breakers.len(), 1);
        assert_eq!(m2.manual_winner, vec![p1]);
    }

    #[test]
    fn matches_sorted_by_time_then_id() {
        let b = parse(json!({
            "matches": [
                {"id": "z", "scheduled_at": "2025-03-02T10:00:00Z"},
                {"id": "b", "scheduled_at": "2025-03-01T10:00:00Z"},
                {"id": "a", "scheduled_at": "2025-03-01T10:00:00Z"}
            ]
        }))
        .unwrap();
        let ids: Vec<&str> = b.matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "z"]);
    }

    #[test]
    fn unplaceable_matches_are_rejected() {
        let err = parse(json!({"matches": [{"id": "a"}]})).unwrap_err();
        assert!(matches!(err, IoError::Bundle(m) if m.contains("match 0")));
        let err = parse(json!({"matches": [{"scheduled_at": "2025-03-01T10:00:00Z"}]})).unwrap_err();
        assert!(matches!(err, IoError::Bundle(_)));
        let dup = json!({"matches": [
            {"id": "a", "scheduled_at": "2025-03-01T10:00:00Z"},
            {"id": "a", "scheduled_at": "2025-03-02T10:00:00Z"}
        ]});
        assert!(matches!(parse(dup).unwrap_err(), IoError::Bundle(m) if m.contains("duplicate")));
    }

    #[test]
    fn params_are_validated_after_overrides() {
        assert!(matches!(parse(json!({"params": {"vote_window_hours": 0}})), Err(IoError::Params(_))));
        assert!(matches!(parse(json!({"params": {"nope": 1}})), Err(IoError::Params(_))));
        let o = ParamsOverride { announce_window_hours: Some(500), ..ParamsOverride::default() };
        assert!(matches!(parse_bundle(&json!({}), &o), Err(IoError::Params(_))));
        let o = ParamsOverride { vote_window_hours: Some(2), ..ParamsOverride::default() };
        assert_eq!(parse_bundle(&json!({}), &o).unwrap().params.vote_window_hours, 2);
    }

    #[test]
    fn digest_ignores_key_order() {
        let a = parse(json!({"matches": [], "params": {"vote_window_hours": 2}})).unwrap();
        let b = parse(json!({"params": {"vote_window_hours": 2}, "matches": []})).unwrap();
        assert_eq!(a.input_sha256, b.input_sha256);
    }

    #[test]
    fn file_loading_and_url_rejection() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"matches": [{{"id": "a", "scheduled_at": "2025-03-01T10:00:00Z"}}]}}"#).unwrap();
        let b = load_bundle(f.path(), &ParamsOverride::default()).unwrap();
        assert_eq!(b.matches.len(), 1);

        let err = load_bundle(Path::new("https://example.org/s.json"), &ParamsOverride::default()).unwrap_err();
        assert!(matches!(err, IoError::Path(m) if m.contains("URL")));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "{{not json").unwrap();
        assert!(matches!(
            load_bundle(bad.path(), &ParamsOverride::default()),
            Err(IoError::Json { .. })
        ));
    }
}
