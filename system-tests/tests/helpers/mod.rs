// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Cosmic Ruler system-tests.
// Purpose: Provide the server harness, HTTP client, and readiness probes.
// Dependencies: system-tests, cosmic-ruler-server, reqwest, tokio
// ============================================================================

//! ## Overview
//! Every suite boots a real server on a loopback port with its own temporary
//! `SQLite` database and drives it over HTTP.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod client;
pub mod harness;
pub mod readiness;
