// crates/cosmic-ruler-core/src/runtime/leaderboard.rs
// ============================================================================
// Module: Leaderboard View
// Description: Read-only projection of listed measurements.
// Purpose: Serve the top entries in both sort directions.
// Dependencies: crate::{core, interfaces}, serde
// ============================================================================

//! ## Overview
//! The view reads straight from the store on every call; nothing is cached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::LeaderboardEntry;
use crate::core::SortOrder;
use crate::interfaces::SharedStore;
use crate::interfaces::StoreError;

/// Default number of entries per direction.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 50;

// ============================================================================
// SECTION: Leaderboard
// ============================================================================

/// Top listed entries, lowest first and highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leaderboard {
    /// Entries sorted low to high.
    pub ascending: Vec<LeaderboardEntry>,
    /// Entries sorted high to low.
    pub descending: Vec<LeaderboardEntry>,
}

/// Builds [`Leaderboard`] snapshots from a store.
#[derive(Clone)]
pub struct LeaderboardView {
    /// Backing store.
    store: SharedStore,
    /// Entries per direction.
    limit: usize,
}

impl LeaderboardView {
    /// Creates a view capped at `limit` entries per direction.
    #[must_use]
    pub fn new(store: SharedStore, limit: usize) -> Self {
        Self {
            store,
            limit,
        }
    }

    /// Returns the current leaderboard.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when either query fails.
    pub fn snapshot(&self) -> Result<Leaderboard, StoreError> {
        Ok(Leaderboard {
            ascending: self.entries(SortOrder::Ascending)?,
            descending: self.entries(SortOrder::Descending)?,
        })
    }

    /// Loads one direction.
    fn entries(&self, order: SortOrder) -> Result<Vec<LeaderboardEntry>, StoreError> {
        Ok(self
            .store
            .listed_measurements(order, self.limit)?
            .iter()
            .map(LeaderboardEntry::from)
            .collect())
    }
}
