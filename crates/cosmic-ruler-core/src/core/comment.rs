// crates/cosmic-ruler-core/src/core/comment.rs
// ============================================================================
// Module: Comment Generator
// Description: Flavor text for a measured length.
// Purpose: Map every integer to one fixed comment by range bucket.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Buckets are checked in a fixed order and the first match wins:
//! non-positive, colossal (>= 1000), then 1-5, 6-10, 11-15, 16-20, and
//! everything else. The mapping is total and deterministic.

// ============================================================================
// SECTION: Comment Table
// ============================================================================

/// Comment for values at or below zero.
pub const NEGATIVE_COMMENT: &str = "Swallowed by a black hole so thoroughly that time itself ran \
                                    backwards. Please file an interstellar repair ticket.";
/// Comment for values of 1000 and above.
pub const COLOSSAL_COMMENT: &str = "A colossus that breaks the laws of physics. The Galactic \
                                    Council has dispatched a survey fleet to take a look.";
/// Comment for values 1 through 5.
pub const TINY_COMMENT: &str =
    "A microscopic marvel from another quantum dimension. Handle with a microscope.";
/// Comment for values 6 through 10.
pub const MODEST_COMMENT: &str =
    "Looks like starship engineers are still at work. Results are slowly emerging.";
/// Comment for values 11 through 15.
pub const RESPECTABLE_COMMENT: &str =
    "Just right for bragging rights at an interstellar bar. Worth a small boast.";
/// Comment for values 16 through 20.
pub const GRAND_COMMENT: &str =
    "Strong gravitational waves ripple nearby. Standard issue for the Galactic Alliance.";
/// Comment for every other positive value below 1000.
pub const LEGENDARY_COMMENT: &str =
    "A legend in superposition. Even the universe turns to look. Salute, traveler.";

/// Smallest value that earns the colossal comment.
const COLOSSAL_THRESHOLD: i32 = 1_000;

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Returns the flavor comment for a length value.
#[must_use]
pub const fn comment_for(value: i32) -> &'static str {
    if value <= 0 {
        return NEGATIVE_COMMENT;
    }
    if value >= COLOSSAL_THRESHOLD {
        return COLOSSAL_COMMENT;
    }
    match value {
        1..=5 => TINY_COMMENT,
        6..=10 => MODEST_COMMENT,
        11..=15 => RESPECTABLE_COMMENT,
        16..=20 => GRAND_COMMENT,
        _ => LEGENDARY_COMMENT,
    }
}
