// crates/cosmic-ruler-core/src/runtime/measure.rs
// ============================================================================
// Module: Measurement Engine
// Description: Name to length assignment with moderation and persistence.
// Purpose: Produce a stable value, comment, and ranks for a submitted name.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! Assignment precedence for a normalized key, first match wins:
//! 1. a ban rejects the request and nothing is written,
//! 2. an easter egg forces its value, rewriting any stored value,
//! 3. an existing measurement keeps its value,
//! 4. otherwise a fresh value is drawn uniformly from `[DRAW_MIN, DRAW_MAX]`.
//!
//! Two requests racing on a brand-new key both try to insert; the loser sees
//! [`StoreError::Conflict`], re-reads the winner's row, and continues from it.
//!
//! Writes never replay a row read earlier in the request: a refresh patches
//! only the value and name columns, and listing is decided by the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::Measurement;
use crate::core::MeasurementPatch;
use crate::core::NewMeasurement;
use crate::core::NormalizedKey;
use crate::core::Ranks;
use crate::core::Timestamp;
use crate::core::ValidationError;
use crate::core::comment_for;
use crate::core::validation;
use crate::interfaces::LengthSource;
use crate::interfaces::SharedStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Smallest freshly drawn length.
pub const DRAW_MIN: i32 = 1;
/// Largest freshly drawn length.
pub const DRAW_MAX: i32 = 25;
/// Rejection message for bans without a reason.
pub const DEFAULT_BAN_MESSAGE: &str = "this string has been banned by the administrator";
/// Rejection-sampling attempts before falling back to a plain modulo.
const MAX_DRAW_ATTEMPTS: usize = 16;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Measurement and listing failures.
#[derive(Debug, Error)]
pub enum MeasureError {
    /// Submitted name failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Normalized name is banned; carries the caller-facing message.
    #[error("{message}")]
    Banned {
        /// Ban reason or the default message.
        message: String,
    },
    /// Listing was requested for a name that was never measured.
    #[error("measure first before uploading to the leaderboard")]
    NotMeasured,
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Result of a successful measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureOutcome {
    /// Persisted measurement after this request.
    pub measurement: Measurement,
    /// Flavor comment for the value.
    pub comment: &'static str,
    /// Position among listed measurements.
    pub ranks: Ranks,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Measures names and toggles their leaderboard visibility.
#[derive(Clone)]
pub struct MeasurementEngine {
    /// Backing store.
    store: SharedStore,
    /// Randomness for fresh draws.
    lengths: Arc<dyn LengthSource>,
}

impl MeasurementEngine {
    /// Creates an engine over a store and a length source.
    #[must_use]
    pub fn new(store: SharedStore, lengths: Arc<dyn LengthSource>) -> Self {
        Self {
            store,
            lengths,
        }
    }

    /// Measures a submitted name.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::Validation`] for a blank or oversized name,
    /// [`MeasureError::Banned`] for a banned key, and
    /// [`MeasureError::Store`] when persistence fails.
    pub fn measure(&self, raw_name: &str, now: Timestamp) -> Result<MeasureOutcome, MeasureError> {
        let name = validation::measurement_name(raw_name)?;
        let key = NormalizedKey::from_input(name);

        if let Some(ban) = self.store.ban_by_key(&key)? {
            return Err(MeasureError::Banned {
                message: ban.reason.unwrap_or_else(|| DEFAULT_BAN_MESSAGE.to_string()),
            });
        }
        let forced = self.store.easter_egg_by_key(&key)?.map(|egg| egg.value);

        let measurement = match self.store.measurement_by_key(&key)? {
            Some(existing) => self.refresh(existing, name, forced, now)?,
            None => self.insert_or_reread(name, &key, forced, now)?,
        };
        let ranks = Ranks::from_counts(
            self.store.count_listed_below(measurement.value)?,
            self.store.count_listed_above(measurement.value)?,
        );
        Ok(MeasureOutcome {
            comment: comment_for(measurement.value),
            ranks,
            measurement,
        })
    }

    /// Lists or unlists a previously measured name.
    ///
    /// Listing an already listed entry keeps its original listing time;
    /// unlisting clears it.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::NotMeasured`] when the name has no measurement.
    pub fn set_listing(
        &self,
        raw_name: &str,
        listed: bool,
        now: Timestamp,
    ) -> Result<Measurement, MeasureError> {
        let name = validation::measurement_name(raw_name)?;
        let key = NormalizedKey::from_input(name);
        let existing = self.store.measurement_by_key(&key)?.ok_or(MeasureError::NotMeasured)?;
        match self.store.set_listed(existing.id, listed, now) {
            Err(StoreError::NotFound(_)) => Err(MeasureError::NotMeasured),
            other => other.map_err(MeasureError::from),
        }
    }

    /// Inserts a first-ever measurement, falling back to the stored row when
    /// a concurrent writer won the race.
    fn insert_or_reread(
        &self,
        name: &str,
        key: &NormalizedKey,
        forced: Option<i32>,
        now: Timestamp,
    ) -> Result<Measurement, StoreError> {
        let record = NewMeasurement {
            name: name.to_string(),
            normalized_name: key.clone(),
            value: forced.unwrap_or_else(|| draw_length(self.lengths.as_ref())),
            created_at: now,
        };
        match self.store.insert_measurement(&record) {
            Err(StoreError::Conflict(_)) => {
                let existing = self.store.measurement_by_key(key)?.ok_or_else(|| {
                    StoreError::Store("measurement missing after insert conflict".to_string())
                })?;
                self.refresh(existing, name, forced, now)
            }
            other => other,
        }
    }

    /// Applies an override value and the latest display name in one update.
    fn refresh(
        &self,
        existing: Measurement,
        name: &str,
        forced: Option<i32>,
        now: Timestamp,
    ) -> Result<Measurement, StoreError> {
        let mut patch = MeasurementPatch::at(now);
        patch.value = forced.filter(|value| *value != existing.value);
        if name != existing.name {
            patch.name = Some(name.to_string());
        }
        if patch.is_empty() {
            return Ok(existing);
        }
        self.store.update_measurement(existing.id, &patch)
    }
}

// ============================================================================
// SECTION: Draws
// ============================================================================

/// Draws a length uniformly from `[DRAW_MIN, DRAW_MAX]`.
///
/// Raw values in the biased tail of the `u32` range are rejected and redrawn;
/// after `MAX_DRAW_ATTEMPTS` rejections the last value is reduced by modulo.
#[must_use]
pub fn draw_length(source: &dyn LengthSource) -> i32 {
    let span = DRAW_MAX.abs_diff(DRAW_MIN) + 1;
    let zone = u32::MAX - (u32::MAX % span);
    let mut raw = source.next_u32();
    for _ in 1 .. MAX_DRAW_ATTEMPTS {
        if raw < zone {
            break;
        }
        raw = source.next_u32();
    }
    let offset = i32::try_from(raw % span).unwrap_or(0);
    DRAW_MIN + offset
}
