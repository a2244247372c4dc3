// crates/cosmic-ruler-server/src/auth.rs
// ============================================================================
// Module: Admin Authentication
// Description: Bearer-token guard and argon2 password hashing.
// Purpose: Fail-closed admin authentication with auditable decisions.
// Dependencies: cosmic-ruler-core, argon2, sha2, axum, tracing
// ============================================================================

//! ## Overview
//! Every admin endpoint except status, bootstrap, and login passes through
//! [`require_admin`]. Missing, malformed, unknown, and expired tokens all
//! produce the same unauthorized response; the distinction is only logged,
//! and only as a SHA-256 fingerprint of the presented token.

// ============================================================================
// SECTION: Imports
// ============================================================================

use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use cosmic_ruler_core::AdminAccount;
use cosmic_ruler_core::CredentialError;
use cosmic_ruler_core::CredentialHasher;
use cosmic_ruler_core::SessionAuthenticator;
use cosmic_ruler_core::SessionDecision;
use cosmic_ruler_core::SessionToken;
use cosmic_ruler_core::Timestamp;
use sha2::Digest;
use sha2::Sha256;

use crate::error::ApiError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Largest accepted `Authorization` header.
const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;
/// Hex characters kept from the token digest in logs.
const FINGERPRINT_HEX_CHARS: usize = 16;
/// Caller-facing message for every rejected token.
pub const UNAUTHORIZED_MESSAGE: &str = "unauthorized";
/// Argon2id hash with default cost parameters and an all-zero digest.
const DECOY_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                         AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

// ============================================================================
// SECTION: Password Hashing
// ============================================================================

/// Argon2id password hashing with a fresh random salt per hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Credentials;

impl CredentialHasher for Argon2Credentials {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| CredentialError::Hash(err.to_string()))
    }

    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| CredentialError::Malformed(err.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    }

    fn decoy_hash(&self) -> &str {
        DECOY_PHC
    }
}

// ============================================================================
// SECTION: Bearer Guard
// ============================================================================

/// Extracts the bearer token from an `Authorization` header value.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] for a missing, oversized, or
/// non-bearer header.
pub fn parse_bearer_token(auth_header: Option<&str>) -> Result<SessionToken, ApiError> {
    let unauthorized = || ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string());
    let header = auth_header.ok_or_else(unauthorized)?;
    if header.len() > MAX_AUTH_HEADER_BYTES {
        return Err(unauthorized());
    }
    let mut parts = header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(unauthorized());
    }
    Ok(SessionToken::new(token))
}

/// Returns a short SHA-256 fingerprint of a token for logs.
#[must_use]
pub fn token_fingerprint(token: &SessionToken) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let digest = Sha256::digest(token.as_str().as_bytes());
    let mut out = String::with_capacity(FINGERPRINT_HEX_CHARS);
    for byte in digest.iter().take(FINGERPRINT_HEX_CHARS / 2) {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}

/// Authenticates an admin request, sliding the session on success.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the token is absent or not live,
/// and [`ApiError::Internal`] when the session store fails.
pub fn require_admin(
    sessions: &SessionAuthenticator,
    headers: &HeaderMap,
    now: Timestamp,
) -> Result<AdminAccount, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
    let token = match parse_bearer_token(header) {
        Ok(token) => token,
        Err(err) => {
            tracing::info!(decision = "deny", reason = "malformed", "admin authentication");
            return Err(err);
        }
    };
    let fingerprint = token_fingerprint(&token);
    let decision =
        sessions.validate(&token, now).map_err(|err| ApiError::Internal(err.to_string()))?;
    let label = decision.label();
    match decision {
        SessionDecision::Allowed(admin) => {
            tracing::info!(
                decision = "allow",
                admin = %admin.username,
                token = %fingerprint,
                "admin authentication"
            );
            Ok(admin)
        }
        SessionDecision::Expired | SessionDecision::Unknown => {
            tracing::info!(
                decision = "deny",
                reason = label,
                token = %fingerprint,
                "admin authentication"
            );
            Err(ApiError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
