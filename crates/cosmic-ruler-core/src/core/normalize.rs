// crates/cosmic-ruler-core/src/core/normalize.rs
// ============================================================================
// Module: Name Normalizer
// Description: Canonical lookup form for user-supplied strings.
// Purpose: Collapse casing and surrounding whitespace into one identity.
// Dependencies: std
// ============================================================================

//! ## Overview
//! `"Alice"`, `" alice "` and `"ALICE"` all normalize to `"alice"` and share
//! one record. The display name keeps whatever casing was submitted last.

/// Trims surrounding whitespace and lowercases the input.
#[must_use]
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}
