// crates/md_algo/src/lib.rs
//! Pure decision functions for match outcomes and best-player awards.
//!
//! Every entry point is a deterministic function of its arguments: no I/O,
//! no shared state, and time is always passed in as `now`.
#![forbid(unsafe_code)]

// ----------------------------- Outcome (public surface) ------------------------------

pub mod outcome {
    // File modules (actual implementations)
    pub mod two_team;
    pub mod round_robin;
    pub mod open_field;
    pub mod dual_field;
    pub mod resolve;

    pub use dual_field::{check_field_separation, resolve_dual_field, FieldSplit, FieldSplitError};
    pub use open_field::{best_differentials, resolve_open_field};
    pub use resolve::resolve_winner;
    pub use round_robin::{
        resolve_round_robin, three_team_games, PairGame, RoundRobinTable, TeamRecord,
    };
    pub use two_team::resolve_two_team;
}

// ----------------------------- Awards (public surface) -------------------------------

pub mod awards {
    pub mod tally;
    pub mod tie_break;

    pub use tally::{tally, VoteTally};
    pub use tie_break::{resolve_tie, TieBreakOutcome, CASCADE};
}

// ----------------------------- Voting window clock ----------------------------------

pub mod window;

// Convenience re-exports (pipeline imports these from crate root)
pub use awards::{resolve_tie, tally, TieBreakOutcome, VoteTally};
pub use outcome::resolve_winner;
pub use window::{match_day_end, phase_at, voting_phase, voting_window, MatchTiming};
