// crates/cosmic-ruler-core/src/core/time.rs
// ============================================================================
// Module: Cosmic Ruler Time Model
// Description: Explicit timestamps for records and session expiry.
// Purpose: Keep wall-clock reads at the host boundary so the core stays replayable.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! The core never reads the wall clock. Hosts pass a [`Timestamp`] into every
//! operation that records or compares time, which keeps session expiry and
//! listing timestamps deterministic under test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use ::time::OffsetDateTime;
use ::time::format_description::well_known::Rfc3339;
use serde::Serialize;
use serde::Serializer;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Milliseconds per hour.
pub const MILLIS_PER_HOUR: i64 = 60 * 60 * 1_000;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Point in time as unix epoch milliseconds.
///
/// # Invariants
/// - Values are supplied by callers; monotonicity is a caller responsibility.
/// - Serializes as an RFC 3339 string; out-of-range values fall back to the
///   raw millisecond count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Builds a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns a timestamp shifted forward by `millis`, saturating on overflow.
    #[must_use]
    pub const fn saturating_add_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Formats the timestamp as RFC 3339 when it is representable.
    #[must_use]
    pub fn to_rfc3339(self) -> Option<String> {
        let nanos = i128::from(self.0).checked_mul(1_000_000)?;
        OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?.format(&Rfc3339).ok()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(text) => f.write_str(&text),
            None => self.0.fmt(f),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_rfc3339() {
            Some(text) => serializer.serialize_str(&text),
            None => serializer.serialize_i64(self.0),
        }
    }
}
