//! Two-team resolution: game wins first, cumulative score second.
//!
//! - A strictly higher score in a game earns one game win; a drawn game earns none.
//! - More game wins takes the match.
//! - Equal game wins fall back to total score across all games.
//! - Equal totals → `Indeterminate`.
//!
//! Unrecorded slots count as 0; a game with no recorded score at all is skipped.

use core::cmp::Ordering;

use md_core::{ScoreMatrix, WinnerDecision};

/// Resolve a two-team match. Teams beyond index 1 are ignored.
pub fn resolve_two_team(m: &ScoreMatrix) -> WinnerDecision {
    let mut wins = [0u32; 2];

    for g in 0..m.game_count() {
        let (a, b) = (m.score(g, 0), m.score(g, 1));
        if a.is_none() && b.is_none() {
            continue;
        }
        match a.unwrap_or(0).cmp(&b.unwrap_or(0)) {
            Ordering::Greater => wins[0] += 1,
            Ordering::Less => wins[1] += 1,
            Ordering::Equal => {}
        }
    }

    let by_wins = wins[0].cmp(&wins[1]);
    let decided = if by_wins != Ordering::Equal { by_wins } else { m.total(0).cmp(&m.total(1)) };

    match decided {
        Ordering::Greater => WinnerDecision::Single(0),
        Ordering::Less => WinnerDecision::Single(1),
        Ordering::Equal => WinnerDecision::Indeterminate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[[u32; 2]]) -> ScoreMatrix {
        ScoreMatrix::new(2, rows.iter().map(|r| vec![Some(r[0]), Some(r[1])]).collect())
    }

    #[test]
    fn game_wins_decide() {
        assert_eq!(resolve_two_team(&matrix(&[[5, 3], [2, 1]])), WinnerDecision::Single(0));
    }

    #[test]
    fn game_wins_beat_totals() {
        // Team 1 wins two narrow games, team 0 one blowout.
        assert_eq!(
            resolve_two_team(&matrix(&[[10, 0], [1, 2], [1, 2]])),
            WinnerDecision::Single(1)
        );
    }

    #[test]
    fn equal_wins_fall_back_to_totals() {
        assert_eq!(resolve_two_team(&matrix(&[[4, 1], [0, 2]])), WinnerDecision::Single(0));
    }

    #[test]
    fn all_level_is_indeterminate() {
        assert_eq!(resolve_two_team(&matrix(&[[3, 3], [2, 2]])), WinnerDecision::Indeterminate);
    }

    #[test]
    fn missing_slot_counts_as_zero() {
        let m = ScoreMatrix::new(2, vec![vec![Some(1), None], vec![None, None]]);
        assert_eq!(resolve_two_team(&m), WinnerDecision::Single(0));
    }
}
