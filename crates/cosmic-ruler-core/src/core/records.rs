// crates/cosmic-ruler-core/src/core/records.rs
// ============================================================================
// Module: Cosmic Ruler Records
// Description: Persisted entities and their insert/update payloads.
// Purpose: Define the store-facing data model shared by every backend.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Records mirror the persisted tables one to one. `New*` payloads carry
//! everything a store needs to insert a row except the identifier, which the
//! store assigns. Records serialize in camelCase for the HTTP surface;
//! [`AdminAccount`] and [`AdminSession`] never serialize because they carry
//! credentials.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::AdminId;
use crate::core::identifiers::BanId;
use crate::core::identifiers::EasterEggId;
use crate::core::identifiers::MeasurementId;
use crate::core::identifiers::NormalizedKey;
use crate::core::identifiers::SessionId;
use crate::core::identifiers::SessionToken;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Measurements
// ============================================================================

/// Stored measurement for one normalized name.
///
/// # Invariants
/// - `normalized_name` identifies at most one measurement.
/// - `listed_at` is `Some` only while `listed` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    /// Store-assigned identifier.
    pub id: MeasurementId,
    /// Display name as most recently submitted.
    pub name: String,
    /// Unique lookup key.
    pub normalized_name: NormalizedKey,
    /// Assigned length value.
    pub value: i32,
    /// Whether the measurement is visible on the leaderboard.
    pub listed: bool,
    /// When the measurement was last newly listed.
    pub listed_at: Option<Timestamp>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last modification time.
    pub updated_at: Timestamp,
}

/// Insert payload for a first-ever measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMeasurement {
    /// Display name.
    pub name: String,
    /// Unique lookup key.
    pub normalized_name: NormalizedKey,
    /// Assigned length value.
    pub value: i32,
    /// Creation time; also used as the initial `updated_at`.
    pub created_at: Timestamp,
}

/// Column-scoped edit of a measurement's naming and value.
///
/// Only fields set to `Some` are written. Listing columns are never part of
/// a patch; they change only through
/// [`crate::MeasurementStore::set_listed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasurementPatch {
    /// New display name.
    pub name: Option<String>,
    /// New lookup key; set only by an admin rename.
    pub normalized_name: Option<NormalizedKey>,
    /// New length value.
    pub value: Option<i32>,
    /// Modification time.
    pub updated_at: Timestamp,
}

impl MeasurementPatch {
    /// Starts a patch that changes nothing but the modification time.
    #[must_use]
    pub const fn at(updated_at: Timestamp) -> Self {
        Self {
            name: None,
            normalized_name: None,
            value: None,
            updated_at,
        }
    }

    /// Returns true when the patch sets no column.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.normalized_name.is_none() && self.value.is_none()
    }
}

/// Sort direction for leaderboard queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Lowest value first.
    Ascending,
    /// Highest value first.
    Descending,
}

/// Public leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Measurement identifier.
    pub id: MeasurementId,
    /// Display name.
    pub name: String,
    /// Length value.
    pub value: i32,
    /// When the entry was listed.
    pub listed_at: Option<Timestamp>,
}

impl From<&Measurement> for LeaderboardEntry {
    fn from(measurement: &Measurement) -> Self {
        Self {
            id: measurement.id,
            name: measurement.name.clone(),
            value: measurement.value,
            listed_at: measurement.listed_at,
        }
    }
}

// ============================================================================
// SECTION: Moderation
// ============================================================================

/// Banned string; matching measurements are rejected outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannedName {
    /// Store-assigned identifier.
    pub id: BanId,
    /// Display value.
    pub value: String,
    /// Unique lookup key.
    pub normalized_value: NormalizedKey,
    /// Optional message returned to rejected callers.
    pub reason: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Upsert payload for a banned string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBan {
    /// Display value.
    pub value: String,
    /// Unique lookup key.
    pub normalized_value: NormalizedKey,
    /// Optional rejection message.
    pub reason: Option<String>,
    /// Creation time (ignored when the key already exists).
    pub created_at: Timestamp,
}

/// Fixed value override for one normalized trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EasterEgg {
    /// Store-assigned identifier.
    pub id: EasterEggId,
    /// Display trigger.
    pub trigger: String,
    /// Unique lookup key.
    pub normalized_trigger: NormalizedKey,
    /// Forced length value.
    pub value: i32,
    /// Optional admin note.
    pub note: Option<String>,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Upsert payload for an easter egg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEasterEgg {
    /// Display trigger.
    pub trigger: String,
    /// Unique lookup key.
    pub normalized_trigger: NormalizedKey,
    /// Forced length value.
    pub value: i32,
    /// Optional admin note.
    pub note: Option<String>,
    /// Creation time (ignored when the key already exists).
    pub created_at: Timestamp,
}

// ============================================================================
// SECTION: Admin Accounts and Sessions
// ============================================================================

/// Admin identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    /// Store-assigned identifier.
    pub id: AdminId,
    /// Unique login name.
    pub username: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

/// Insert payload for an admin account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdmin {
    /// Unique login name.
    pub username: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Live bearer session for an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    /// Store-assigned identifier.
    pub id: SessionId,
    /// Bearer token.
    pub token: SessionToken,
    /// Owning admin.
    pub admin_id: AdminId,
    /// Expiry; slid forward on every successful validation.
    pub expires_at: Timestamp,
}

/// Insert payload for a session whose owner is already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    /// Bearer token.
    pub token: SessionToken,
    /// Owning admin.
    pub admin_id: AdminId,
    /// Initial expiry.
    pub expires_at: Timestamp,
}
