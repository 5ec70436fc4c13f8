//! Determinism utilities: stable ordering for tokens and candidate sets.
//!
//! Lists the engine reports (manual-review ids) are emitted in a stable
//! total order so reruns are byte-identical.

use core::cmp::Ordering;

use crate::tokens::{MatchId, PlayerId};

/// Provide a **total**, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! stable_ord_by_str {
    ($($t:ty),+) => {
        $(
            impl StableOrd for $t {
                #[inline]
                fn stable_cmp(&self, other: &Self) -> Ordering {
                    self.as_str().cmp(other.as_str())
                }
            }
        )+
    };
}

stable_ord_by_str!(PlayerId, MatchId);

/// Sort **in place** by the stable order.
#[inline]
pub fn sort_stable<T: StableOrd>(xs: &mut [T]) {
    xs.sort_by(|a, b| a.stable_cmp(b));
}
