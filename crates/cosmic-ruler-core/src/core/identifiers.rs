// crates/cosmic-ruler-core/src/core/identifiers.rs
// ============================================================================
// Module: Cosmic Ruler Identifiers
// Description: Strongly typed record identifiers and lookup keys.
// Purpose: Keep row ids, normalized keys, and session tokens from mixing.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Row identifiers are store-assigned integers and serialize as plain numbers.
//! [`NormalizedKey`] can only be built through [`crate::normalize`], so every
//! key handed to a store is already trimmed and lowercased.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::normalize::normalize;

// ============================================================================
// SECTION: Row Identifiers
// ============================================================================

/// Declares an integer row identifier newtype.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw store identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw identifier value.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

row_id!(
    /// Identifier of a measurement record.
    MeasurementId
);
row_id!(
    /// Identifier of a banned-name record.
    BanId
);
row_id!(
    /// Identifier of an easter-egg override.
    EasterEggId
);
row_id!(
    /// Identifier of an admin account.
    AdminId
);
row_id!(
    /// Identifier of an admin session row.
    SessionId
);

// ============================================================================
// SECTION: Normalized Keys
// ============================================================================

/// Canonical lookup identity for names, banned strings, and triggers.
///
/// # Invariants
/// - Always the output of [`normalize`]: no surrounding whitespace, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    /// Normalizes user input into a lookup key.
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        Self(normalize(input))
    }

    /// Rebuilds a key from a value that was normalized before it was stored.
    ///
    /// Stores use this when reading rows back; the value is normalized again
    /// so a hand-edited row cannot break the invariant.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        Self::from_input(value)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the key is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Session Tokens
// ============================================================================

/// Opaque bearer token handed to an authenticated admin.
///
/// # Invariants
/// - Never logged; use a fingerprint when a token must be correlated.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token string.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}
