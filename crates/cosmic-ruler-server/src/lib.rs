// crates/cosmic-ruler-server/src/lib.rs
// ============================================================================
// Module: Cosmic Ruler Server Library
// Description: HTTP host for the Cosmic Ruler core.
// Purpose: Expose the server, its error taxonomy, and host-side sources.
// Dependencies: crate::{auth, entropy, error, routes, server}
// ============================================================================

//! ## Overview
//! The server owns everything the core leaves to its host: the `SQLite`
//! store, OS entropy, argon2 password hashing, the wall clock, and the JSON
//! API under `/api`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod entropy;
pub mod error;
mod routes;
pub mod server;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth::Argon2Credentials;
pub use entropy::OsEntropy;
pub use error::ApiError;
pub use server::RulerServer;
pub use server::ServerError;
pub use server::system_now;
