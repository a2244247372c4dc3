// crates/cosmic-ruler-core/src/core/ranks.rs
// ============================================================================
// Module: Rank Calculator
// Description: Ascending and descending positions among listed measurements.
// Purpose: Place a value within the leaderboard population.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A rank is the number of listed values strictly on one side of the given
//! value, plus one. Equal values therefore share a position (1, 2, 2, 4).
//! Stores answer the two counts directly; [`compute_ranks`] does the same over
//! an in-memory population.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Ranks
// ============================================================================

/// Leaderboard positions for one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ranks {
    /// Position when sorted low to high.
    pub ascending: u64,
    /// Position when sorted high to low.
    pub descending: u64,
}

impl Ranks {
    /// Builds ranks from the counts of listed values below and above.
    #[must_use]
    pub const fn from_counts(below: u64, above: u64) -> Self {
        Self {
            ascending: below.saturating_add(1),
            descending: above.saturating_add(1),
        }
    }
}

/// Computes ranks for `value` against a population of listed values.
#[must_use]
pub fn compute_ranks<I>(value: i32, listed: I) -> Ranks
where
    I: IntoIterator<Item = i32>,
{
    let (below, above) = listed.into_iter().fold((0_u64, 0_u64), |(below, above), other| {
        if other < value {
            (below.saturating_add(1), above)
        } else if other > value {
            (below, above.saturating_add(1))
        } else {
            (below, above)
        }
    });
    Ranks::from_counts(below, above)
}
