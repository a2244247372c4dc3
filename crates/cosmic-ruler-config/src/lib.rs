// crates/cosmic-ruler-config/src/lib.rs
// ============================================================================
// Module: Cosmic Ruler Config Library
// Description: Canonical config model, validation, and example document.
// Purpose: Single source of truth for cosmic-ruler.toml semantics.
// Dependencies: cosmic-ruler-core, cosmic-ruler-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `cosmic-ruler-config` defines the configuration model for the Cosmic
//! Ruler server. Validation is strict and fail-closed: a missing `[store]`
//! table, an unparsable bind address, or an out-of-range limit rejects the
//! whole file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
