// system-tests/src/lib.rs
// ============================================================================
// Module: Cosmic Ruler System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common settings for Cosmic Ruler system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the Cosmic Ruler
//! system-tests binaries in `system-tests/tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
