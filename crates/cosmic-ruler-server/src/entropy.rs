// crates/cosmic-ruler-server/src/entropy.rs
// ============================================================================
// Module: OS Entropy
// Description: Operating-system randomness for length draws and session tokens.
// Purpose: Implement the core entropy interfaces for the production host.
// Dependencies: cosmic-ruler-core, rand, base64
// ============================================================================

//! ## Overview
//! Length draws prefer the OS CSPRNG and fall back to the thread-local
//! generator when it is unavailable. Session tokens never fall back: a token
//! is 48 OS-random bytes encoded as base64url without padding, or an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use cosmic_ruler_core::EntropyError;
use cosmic_ruler_core::LengthSource;
use cosmic_ruler_core::SessionToken;
use cosmic_ruler_core::TokenSource;
use rand::RngCore;
use rand::rngs::OsRng;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Raw bytes per session token.
pub const TOKEN_BYTES: usize = 48;

// ============================================================================
// SECTION: Source
// ============================================================================

/// Entropy backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl LengthSource for OsEntropy {
    fn next_u32(&self) -> u32 {
        let mut bytes = [0_u8; 4];
        if OsRng.try_fill_bytes(&mut bytes).is_ok() {
            return u32::from_le_bytes(bytes);
        }
        tracing::warn!("os entropy unavailable; drawing from thread rng");
        rand::thread_rng().next_u32()
    }
}

impl TokenSource for OsEntropy {
    fn new_token(&self) -> Result<SessionToken, EntropyError> {
        let mut bytes = [0_u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|err| EntropyError::Unavailable(err.to_string()))?;
        Ok(SessionToken::new(URL_SAFE_NO_PAD.encode(bytes)))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
