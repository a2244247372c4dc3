// crates/cosmic-ruler-core/src/runtime/sessions.rs
// ============================================================================
// Module: Session Authenticator
// Description: Bearer session issue, validation, sliding expiry, and pruning.
// Purpose: Gate admin operations behind store-backed sessions.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Session lifecycle: `Created -> Valid -> Expired`.
//!
//! - [`SessionAuthenticator::issue`] stores a fresh token valid for one TTL.
//! - [`SessionAuthenticator::validate`] deletes a token whose expiry is in the
//!   past; otherwise it slides the expiry to `now + ttl`.
//! - Unknown and expired tokens are distinguished only for logging; callers
//!   must surface both the same way.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AdminAccount;
use crate::core::AdminId;
use crate::core::MILLIS_PER_HOUR;
use crate::core::NewSession;
use crate::core::SessionToken;
use crate::core::Timestamp;
use crate::interfaces::EntropyError;
use crate::interfaces::SharedStore;
use crate::interfaces::StoreError;
use crate::interfaces::TokenSource;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Session lifetime policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Lifetime granted on issue and on every successful validation.
    ttl_millis: i64,
}

impl SessionPolicy {
    /// Default lifetime in hours.
    pub const DEFAULT_TTL_HOURS: u32 = 12;

    /// Builds a policy from a lifetime in hours.
    #[must_use]
    pub fn from_hours(hours: u32) -> Self {
        Self {
            ttl_millis: MILLIS_PER_HOUR.saturating_mul(i64::from(hours)),
        }
    }

    /// Returns the lifetime in milliseconds.
    #[must_use]
    pub const fn ttl_millis(self) -> i64 {
        self.ttl_millis
    }

    /// Returns the expiry for a session touched at `now`.
    #[must_use]
    pub const fn expiry_from(self, now: Timestamp) -> Timestamp {
        now.saturating_add_millis(self.ttl_millis)
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::from_hours(Self::DEFAULT_TTL_HOURS)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while issuing a session.
#[derive(Debug, Error)]
pub enum SessionIssueError {
    /// Token generation failed.
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    /// Store rejected the session.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Outcome of validating a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDecision {
    /// Token is live; its expiry has been slid forward.
    Allowed(AdminAccount),
    /// Token existed but had expired and has been deleted.
    Expired,
    /// Token is not known to the store.
    Unknown,
}

impl SessionDecision {
    /// Returns the admin for an allowed decision.
    #[must_use]
    pub fn into_admin(self) -> Option<AdminAccount> {
        match self {
            Self::Allowed(admin) => Some(admin),
            Self::Expired | Self::Unknown => None,
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Allowed(_) => "allowed",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }
}

// ============================================================================
// SECTION: Authenticator
// ============================================================================

/// Issues and validates admin sessions.
#[derive(Clone)]
pub struct SessionAuthenticator {
    /// Backing store.
    store: SharedStore,
    /// Token generator.
    tokens: Arc<dyn TokenSource>,
    /// Lifetime policy.
    policy: SessionPolicy,
}

impl SessionAuthenticator {
    /// Creates an authenticator.
    #[must_use]
    pub fn new(store: SharedStore, tokens: Arc<dyn TokenSource>, policy: SessionPolicy) -> Self {
        Self {
            store,
            tokens,
            policy,
        }
    }

    /// Returns the lifetime policy.
    #[must_use]
    pub const fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Generates a token without storing it.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError`] when the token source fails.
    pub fn generate_token(&self) -> Result<SessionToken, EntropyError> {
        self.tokens.new_token()
    }

    /// Stores a new session for `admin_id` and returns its token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionIssueError`] when token generation or the insert fails.
    pub fn issue(
        &self,
        admin_id: AdminId,
        now: Timestamp,
    ) -> Result<SessionToken, SessionIssueError> {
        let token = self.generate_token()?;
        self.store.insert_session(&NewSession {
            token: token.clone(),
            admin_id,
            expires_at: self.policy.expiry_from(now),
        })?;
        Ok(token)
    }

    /// Validates a token at `now`, sliding or deleting it as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store fails.
    pub fn validate(
        &self,
        token: &SessionToken,
        now: Timestamp,
    ) -> Result<SessionDecision, StoreError> {
        let Some((session, admin)) = self.store.session_with_admin(token)? else {
            return Ok(SessionDecision::Unknown);
        };
        if session.expires_at < now {
            self.store.delete_session(session.id)?;
            return Ok(SessionDecision::Expired);
        }
        match self.store.extend_session(session.id, self.policy.expiry_from(now)) {
            Ok(()) => Ok(SessionDecision::Allowed(admin)),
            Err(StoreError::NotFound(_)) => Ok(SessionDecision::Unknown),
            Err(err) => Err(err),
        }
    }

    /// Deletes every session that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store fails.
    pub fn prune(&self, now: Timestamp) -> Result<u64, StoreError> {
        self.store.prune_sessions(now)
    }
}
