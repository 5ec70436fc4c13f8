//! Winner resolution entry point: dispatch on team count and field metadata.

use md_core::{FieldAssignment, ScoreMatrix, WinnerDecision};

use super::dual_field::{check_field_separation, resolve_dual_field};
use super::open_field::resolve_open_field;
use super::round_robin::{resolve_round_robin, three_team_games};
use super::two_team::resolve_two_team;

/// Resolve the winning team(s) of a match.
///
/// - no recorded scores, or fewer than two teams → `Indeterminate`
/// - 2 teams → game wins, then totals
/// - 3 teams → rotation round robin
/// - 4+ teams with a valid field split → per-field round robins, united
/// - 4+ teams otherwise (no metadata, or invalid split) → best single-game differential
pub fn resolve_winner(m: &ScoreMatrix, fields: Option<&FieldAssignment>) -> WinnerDecision {
    if m.is_empty() {
        return WinnerDecision::Indeterminate;
    }

    match m.team_count() {
        0 | 1 => WinnerDecision::Indeterminate,
        2 => resolve_two_team(m),
        3 => resolve_round_robin(&three_team_games(m)),
        n => {
            if let Some(fa) = fields.filter(|fa| !fa.is_empty()) {
                match check_field_separation(fa, n) {
                    Ok(split) => return resolve_dual_field(m, fa, &split),
                    Err(reason) => {
                        tracing::debug!(?reason, teams = n, "field separation invalid; using single-field rule");
                    }
                }
            }
            resolve_open_field(m)
        }
    }
}
