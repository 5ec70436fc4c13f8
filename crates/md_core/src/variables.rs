//! Engine parameters with safe defaults and domain validation.
//!
//! `Params` is always passed explicitly; no function reads a global default
//! once a run has started.

use core::fmt;

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Tunable windows for the voting clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Params {
    /// Default offset from anchor to `vote_end`.
    pub vote_window_hours: u32,
    /// Offset from `vote_end` to `announce_end`.
    pub announce_window_hours: u32,
    /// Manual-gate matches become eligible this long after the nominal match time.
    pub manual_gate_delay_hours: u32,
    /// Fixed offset defining the match calendar day.
    pub utc_offset_minutes: i32,
    /// Clamp `vote_end` to the end of the match calendar day.
    pub clamp_vote_end_to_match_day: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            vote_window_hours: 24,
            announce_window_hours: 24,
            manual_gate_delay_hours: 3,
            utc_offset_minutes: 0,
            clamp_vote_end_to_match_day: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarsError {
    Domain(String),
}

impl fmt::Display for VarsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarsError::Domain(m) => write!(f, "parameter domain error: {m}"),
        }
    }
}

impl std::error::Error for VarsError {}

pub type VarsResult<T> = Result<T, VarsError>;

impl Params {
    /// Check every field against its documented domain.
    pub fn validate_domains(&self) -> VarsResult<()> {
        if !(1..=168).contains(&self.vote_window_hours) {
            return Err(VarsError::Domain(format!(
                "vote_window_hours out of range: {}",
                self.vote_window_hours
            )));
        }
        if self.announce_window_hours > 168 {
            return Err(VarsError::Domain(format!(
                "announce_window_hours out of range: {}",
                self.announce_window_hours
            )));
        }
        if self.manual_gate_delay_hours > 72 {
            return Err(VarsError::Domain(format!(
                "manual_gate_delay_hours out of range: {}",
                self.manual_gate_delay_hours
            )));
        }
        if !(-720..=840).contains(&self.utc_offset_minutes) {
            return Err(VarsError::Domain(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Calendar-day offset; an out-of-domain value degrades to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn vote_window(&self) -> Duration {
        Duration::hours(i64::from(self.vote_window_hours))
    }

    pub fn announce_window(&self) -> Duration {
        Duration::hours(i64::from(self.announce_window_hours))
    }

    pub fn manual_gate_delay(&self) -> Duration {
        Duration::hours(i64::from(self.manual_gate_delay_hours))
    }
}

/// Per-run overrides layered on top of a bundle's `params` (CLI flags).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParamsOverride {
    pub vote_window_hours: Option<u32>,
    pub announce_window_hours: Option<u32>,
    pub manual_gate_delay_hours: Option<u32>,
    pub utc_offset_minutes: Option<i32>,
}

impl ParamsOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every set override; domains are checked afterwards by the caller.
    pub fn apply(&self, p: &mut Params) {
        if let Some(v) = self.vote_window_hours {
            p.vote_window_hours = v;
        }
        if let Some(v) = self.announce_window_hours {
            p.announce_window_hours = v;
        }
        if let Some(v) = self.manual_gate_delay_hours {
            p.manual_gate_delay_hours = v;
        }
        if let Some(v) = self.utc_offset_minutes {
            p.utc_offset_minutes = v;
        }
    }
}
