// crates/cosmic-ruler-core/src/core/mod.rs
// ============================================================================
// Module: Cosmic Ruler Domain Model
// Description: Identifiers, timestamps, records, and pure measurement helpers.
// Purpose: Group the side-effect free building blocks of the core.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Everything in this module is pure: no I/O, no clocks, no randomness.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod comment;
pub mod identifiers;
pub mod normalize;
pub mod ranks;
pub mod records;
pub mod time;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use comment::comment_for;
pub use identifiers::AdminId;
pub use identifiers::BanId;
pub use identifiers::EasterEggId;
pub use identifiers::MeasurementId;
pub use identifiers::NormalizedKey;
pub use identifiers::SessionId;
pub use identifiers::SessionToken;
pub use normalize::normalize;
pub use ranks::Ranks;
pub use ranks::compute_ranks;
pub use records::AdminAccount;
pub use records::AdminSession;
pub use records::BannedName;
pub use records::EasterEgg;
pub use records::LeaderboardEntry;
pub use records::Measurement;
pub use records::MeasurementPatch;
pub use records::NewAdmin;
pub use records::NewBan;
pub use records::NewEasterEgg;
pub use records::NewMeasurement;
pub use records::NewSession;
pub use records::SortOrder;
pub use time::MILLIS_PER_HOUR;
pub use time::Timestamp;
pub use validation::ValidationError;
