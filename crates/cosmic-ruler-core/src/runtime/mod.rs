// crates/cosmic-ruler-core/src/runtime/mod.rs
// ============================================================================
// Module: Cosmic Ruler Runtime
// Description: Measurement engine, leaderboard view, sessions, and admin console.
// Purpose: Execute every Cosmic Ruler operation against an injected store.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime services hold a [`crate::SharedStore`] and the host-supplied
//! entropy and hashing interfaces. Every operation takes the current
//! [`crate::Timestamp`] as an argument so behavior is reproducible in tests.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod admin;
pub mod leaderboard;
pub mod measure;
pub mod sessions;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admin::AdminConsole;
pub use admin::AdminError;
pub use admin::BootstrapOutcome;
pub use admin::SetupStatus;
pub use leaderboard::DEFAULT_LEADERBOARD_LIMIT;
pub use leaderboard::Leaderboard;
pub use leaderboard::LeaderboardView;
pub use measure::DEFAULT_BAN_MESSAGE;
pub use measure::DRAW_MAX;
pub use measure::DRAW_MIN;
pub use measure::MeasureError;
pub use measure::MeasureOutcome;
pub use measure::MeasurementEngine;
pub use measure::draw_length;
pub use sessions::SessionAuthenticator;
pub use sessions::SessionDecision;
pub use sessions::SessionIssueError;
pub use sessions::SessionPolicy;
pub use store::InMemoryStore;
