//! md_core: Core types, tokens, exact ratios, ordering helpers and engine params.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`md_io`, `md_algo`, `md_pipeline`, `md_cli`).
//!
//! - Tokens: `PlayerId`, `MatchId`, `SeasonKey`
//! - Entities: `ScoreMatrix`, `FieldAssignment`, `Vote`, `TieBreakerRecord`,
//!   `VotingWindow`, `Phase`, `WinnerDecision`
//! - Integer-first `Ratio` for exact comparisons
//! - Engine `Params` (window lengths, manual gate delay, calendar-day offset)
//!
//! No wall clock is read anywhere in this crate.

#![forbid(unsafe_code)]

/// Define a serde'd enum with explicit wire tokens plus `as_str`/`Display`.
macro_rules! serde_enum {
    ($(#[$meta:meta])* $name:ident => { $($variant:ident = $token:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        InvalidToken,
        InvalidRatio,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::InvalidToken => write!(f, "invalid token"),
                CoreError::InvalidRatio => write!(f, "invalid ratio"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod tokens {
    //! Identifier tokens for players, matches and seasons.
    //!
    //! Player ids come from loosely-validated legacy records (UUIDs, slugs,
    //! display names in any script), so the charset is permissive: any
    //! non-control character, trimmed, 1..=128 bytes.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    const TOKEN_MAX_LEN: usize = 128;

    fn is_token(s: &str) -> bool {
        let len = s.len();
        if !(1..=TOKEN_MAX_LEN).contains(&len) {
            return false;
        }
        if s.trim() != s {
            return false;
        }
        !s.chars().any(|c| c.is_control())
    }

    macro_rules! def_token {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, serde::Serialize, serde::Deserialize)]
            #[serde(try_from = "String", into = "String")]
            pub struct $name(String);

            impl $name {
                pub fn as_str(&self) -> &str { &self.0 }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken) }
                }
            }

            impl TryFrom<String> for $name {
                type Error = CoreError;
                fn try_from(s: String) -> Result<Self, Self::Error> {
                    if is_token(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken) }
                }
            }

            impl From<$name> for String {
                fn from(t: $name) -> String { t.0 }
            }
        }
    }

    def_token!(
        /// Award candidate (a rostered player).
        PlayerId
    );
    def_token!(
        /// Persisted match identifier.
        MatchId
    );
    def_token!(
        /// Season bucket used by cross-season counts (e.g. "2025").
        SeasonKey
    );
}

pub mod rounding {
    //! Integer-first ratio type and helpers.

    use crate::errors::CoreError;
    use core::cmp::Ordering;

    /// Exact ratio with normalized sign and positive denominator.
    /// Built only through [`new_ratio_checked`] or [`Ratio::from_int`].
    #[derive(Clone, Copy, Debug, serde::Serialize)]
    pub struct Ratio {
        num: i128,
        den: i128,
    }

    fn gcd_i128(mut a: i128, mut b: i128) -> i128 {
        a = a.abs();
        b = b.abs();
        while b != 0 {
            let r = a % b;
            a = b;
            b = r;
        }
        if a == 0 { 1 } else { a }
    }

    /// Construct a ratio, ensuring `den > 0` and reducing by GCD.
    pub fn new_ratio_checked(num: i128, den: i128) -> Result<Ratio, CoreError> {
        if den == 0 {
            return Err(CoreError::InvalidRatio);
        }
        let (mut n, mut d) = (num, den);
        if d < 0 {
            n = -n;
            d = -d;
        }
        let g = gcd_i128(n, d);
        Ok(Ratio { num: n / g, den: d / g })
    }

    impl Ratio {
        pub fn from_int(n: i128) -> Self {
            Ratio { num: n, den: 1 }
        }

        pub fn num(&self) -> i128 {
            self.num
        }

        pub fn den(&self) -> i128 {
            self.den
        }
    }

    /// Compare two ratios exactly (cross-multiply).
    ///
    /// NOTE: Uses checked multiplication; in the unlikely event of overflow,
    /// falls back to `f64` comparison (deterministic but lossy).
    pub fn cmp_ratio(a: &Ratio, b: &Ratio) -> Ordering {
        let g1 = gcd_i128(a.num, b.num);
        let g2 = gcd_i128(a.den, b.den);
        let an = a.num / g1;
        let bn = b.num / g1;
        let ad = a.den / g2;
        let bd = b.den / g2;

        if let (Some(l), Some(r)) = (an.checked_mul(bd), bn.checked_mul(ad)) {
            l.cmp(&r)
        } else {
            let af = (a.num as f64) / (a.den as f64);
            let bf = (b.num as f64) / (b.den as f64);
            af.partial_cmp(&bf).unwrap_or(Ordering::Equal)
        }
    }

    impl PartialEq for Ratio {
        fn eq(&self, other: &Self) -> bool {
            cmp_ratio(self, other) == Ordering::Equal
        }
    }

    impl Eq for Ratio {}

    impl PartialOrd for Ratio {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for Ratio {
        fn cmp(&self, other: &Self) -> Ordering {
            cmp_ratio(self, other)
        }
    }

}

pub mod determinism;
pub mod entities;
pub mod variables;

pub use entities::{
    FieldAssignment, FieldPairing, Phase, ScoreMatrix, TeamIndex, TieBreakCategory,
    TieBreakerRecord, Vote, VotingWindow, WinnerDecision,
};
pub use tokens::{MatchId, PlayerId, SeasonKey};
pub use variables::{Params, ParamsOverride};
