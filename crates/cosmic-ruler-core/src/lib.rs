// crates/cosmic-ruler-core/src/lib.rs
// ============================================================================
// Module: Cosmic Ruler Core Library
// Description: Public API surface for the Cosmic Ruler core.
// Purpose: Expose domain types, store interfaces, and runtime services.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Cosmic Ruler core maps a submitted name to a stable "length", attaches a
//! flavor comment and leaderboard ranks, and gates the admin console behind
//! store-backed sessions. It is backend-agnostic: persistence, randomness,
//! password hashing, and wall-clock time are all supplied by the host through
//! explicit interfaces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AdminStore;
pub use interfaces::CredentialError;
pub use interfaces::CredentialHasher;
pub use interfaces::EntropyError;
pub use interfaces::LengthSource;
pub use interfaces::MeasurementStore;
pub use interfaces::ModerationStore;
pub use interfaces::RulerStore;
pub use interfaces::SharedStore;
pub use interfaces::StoreError;
pub use interfaces::TokenSource;
pub use runtime::AdminConsole;
pub use runtime::AdminError;
pub use runtime::BootstrapOutcome;
pub use runtime::DEFAULT_BAN_MESSAGE;
pub use runtime::DEFAULT_LEADERBOARD_LIMIT;
pub use runtime::DRAW_MAX;
pub use runtime::DRAW_MIN;
pub use runtime::InMemoryStore;
pub use runtime::Leaderboard;
pub use runtime::LeaderboardView;
pub use runtime::MeasureError;
pub use runtime::MeasureOutcome;
pub use runtime::MeasurementEngine;
pub use runtime::SessionAuthenticator;
pub use runtime::SessionDecision;
pub use runtime::SessionIssueError;
pub use runtime::SessionPolicy;
pub use runtime::SetupStatus;
pub use runtime::draw_length;
