//! Voting window clock: derive a match's window and report its phase at `now`.
//!
//! `hidden → pending → vote → announce → closed`. The clock never reads the
//! wall clock; `now` is always an argument.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use md_core::{Params, Phase, VotingWindow};

/// What the clock needs to know about a match besides its window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchTiming {
    /// Nominal match time.
    pub anchor: DateTime<Utc>,
    pub requires_manual_activation: bool,
    pub manually_opened: bool,
    pub has_score_data: bool,
}

/// `t + d`, saturating at the last representable instant.
fn saturating_add(t: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    t.checked_add_signed(d).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Start of the calendar day after `anchor`'s day in `offset`, as UTC.
pub fn match_day_end(anchor: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let shift = Duration::seconds(i64::from(offset.local_minus_utc()));
    anchor
        .naive_utc()
        .checked_add_signed(shift)
        .and_then(|local| local.date().succ_opt())
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.checked_sub_signed(shift))
        .map(|utc| Utc.from_utc_datetime(&utc))
        .unwrap_or_else(|| saturating_add(anchor, Duration::hours(24)))
}

/// Build the window anchored at `anchor`.
///
/// `vote_end` is `anchor + vote_window`, clamped to the match day's end when
/// that comes first and clamping is on.
pub fn voting_window(anchor: DateTime<Utc>, params: &Params) -> VotingWindow {
    let default_end = saturating_add(anchor, params.vote_window());
    let vote_end = if params.clamp_vote_end_to_match_day {
        default_end.min(match_day_end(anchor, params.offset()))
    } else {
        default_end
    };
    VotingWindow { anchor, vote_end, announce_end: saturating_add(vote_end, params.announce_window()) }
}

/// Phase of an eligible match at `now`. Boundaries belong to the later phase.
pub fn phase_at(w: &VotingWindow, now: DateTime<Utc>) -> Phase {
    if now < w.anchor {
        Phase::Pending
    } else if now < w.vote_end {
        Phase::Vote
    } else if now < w.announce_end {
        Phase::Announce
    } else {
        Phase::Closed
    }
}

/// Full clock: apply the hidden gates, then [`phase_at`].
pub fn voting_phase(t: &MatchTiming, params: &Params, now: DateTime<Utc>) -> Phase {
    if !t.has_score_data {
        return Phase::Hidden;
    }
    if t.requires_manual_activation
        && !t.manually_opened
        && now < saturating_add(t.anchor, params.manual_gate_delay())
    {
        return Phase::Hidden;
    }
    phase_at(&voting_window(t.anchor, params), now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, h, m, 0).unwrap()
    }

    fn next_day(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 11, h, 0, 0).unwrap()
    }

    fn timing(anchor: DateTime<Utc>) -> MatchTiming {
        MatchTiming {
            anchor,
            requires_manual_activation: false,
            manually_opened: false,
            has_score_data: true,
        }
    }

    #[test]
    fn vote_end_clamped_to_midnight() {
        let w = voting_window(at(20, 0), &Params::default());
        assert_eq!(w.vote_end, next_day(0));
        assert_eq!(w.announce_end, Utc.with_ymd_and_hms(2024, 5, 12, 0, 0, 0).unwrap());
        assert!(w.anchor <= w.vote_end && w.vote_end <= w.announce_end);
    }

    #[test]
    fn short_window_is_not_clamped() {
        let p = Params { vote_window_hours: 2, ..Params::default() };
        let w = voting_window(at(20, 0), &p);
        assert_eq!(w.vote_end, at(22, 0));
    }

    #[test]
    fn clamping_can_be_disabled() {
        let p = Params { clamp_vote_end_to_match_day: false, ..Params::default() };
        assert_eq!(voting_window(at(20, 0), &p).vote_end, next_day(20));
    }

    #[test]
    fn offset_moves_the_day_boundary() {
        // 20:00 UTC is 22:00 at +02:00; local midnight is 22:00 UTC.
        let p = Params { utc_offset_minutes: 120, ..Params::default() };
        assert_eq!(match_day_end(at(20, 0), p.offset()), at(22, 0));
        assert_eq!(voting_window(at(20, 0), &p).vote_end, at(22, 0));
    }

    #[test]
    fn phases_follow_the_window() {
        let p = Params::default();
        let t = timing(at(20, 0));
        assert_eq!(voting_phase(&t, &p, at(19, 0)), Phase::Pending);
        assert_eq!(voting_phase(&t, &p, at(20, 0)), Phase::Vote);
        assert_eq!(voting_phase(&t, &p, at(23, 59)), Phase::Vote);
        assert_eq!(voting_phase(&t, &p, next_day(0)), Phase::Announce);
        assert_eq!(voting_phase(&t, &p, next_day(12)), Phase::Announce);
        assert_eq!(voting_phase(&t, &p, Utc.with_ymd_and_hms(2024, 5, 12, 0, 0, 0).unwrap()), Phase::Closed);
    }

    #[test]
    fn window_saturates_at_the_end_of_time() {
        let anchor = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let w = voting_window(anchor, &Params { clamp_vote_end_to_match_day: false, ..Params::default() });
        assert_eq!(w.vote_end, DateTime::<Utc>::MAX_UTC);
        assert_eq!(w.announce_end, DateTime::<Utc>::MAX_UTC);

        let w = voting_window(DateTime::<Utc>::MAX_UTC, &Params::default());
        assert!(w.anchor <= w.vote_end && w.vote_end <= w.announce_end);

        let gated = MatchTiming { requires_manual_activation: true, ..timing(anchor) };
        assert_eq!(voting_phase(&gated, &Params::default(), anchor), Phase::Hidden);
    }

    #[test]
    fn no_scores_is_hidden() {
        let t = MatchTiming { has_score_data: false, ..timing(at(20, 0)) };
        assert_eq!(voting_phase(&t, &Params::default(), next_day(12)), Phase::Hidden);
    }

    #[test]
    fn manual_gate_holds_until_delay_or_opening() {
        let p = Params::default();
        let gated = MatchTiming { requires_manual_activation: true, ..timing(at(18, 0)) };
        assert_eq!(voting_phase(&gated, &p, at(17, 0)), Phase::Hidden);
        assert_eq!(voting_phase(&gated, &p, at(20, 59)), Phase::Hidden);
        assert_eq!(voting_phase(&gated, &p, at(21, 0)), Phase::Vote);

        let opened = MatchTiming { manually_opened: true, ..gated };
        assert_eq!(voting_phase(&opened, &p, at(18, 30)), Phase::Vote);
        assert_eq!(voting_phase(&opened, &p, at(17, 0)), Phase::Pending);
    }
}
