// crates/cosmic-ruler-store-sqlite/src/lib.rs
// ============================================================================
// Module: Cosmic Ruler SQLite Store
// Description: Durable store backend using SQLite WAL.
// Purpose: Provide production persistence for every Cosmic Ruler store interface.
// Dependencies: cosmic-ruler-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed implementation of
//! [`cosmic_ruler_core::MeasurementStore`], [`cosmic_ruler_core::ModerationStore`],
//! and [`cosmic_ruler_core::AdminStore`]. Every at-most-one-row rule is a
//! `UNIQUE` constraint in the schema, and violations surface as
//! [`cosmic_ruler_core::StoreError::Conflict`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SCHEMA_VERSION;
pub use store::SqliteRulerStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
