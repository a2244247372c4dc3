// crates/cosmic-ruler-core/src/runtime/admin.rs
// ============================================================================
// Module: Admin Console
// Description: Setup gate, login, and moderation/measurement curation.
// Purpose: Implement every admin operation behind one validated surface.
// Dependencies: crate::{core, interfaces, runtime::sessions}, serde, thiserror
// ============================================================================

//! ## Overview
//! The setup gate is one-way: the first successful bootstrap closes it inside
//! the same store transaction that creates the admin, and nothing reopens it.
//! Callers authenticate with [`crate::SessionAuthenticator::validate`] before
//! invoking any curation method; the console itself does not re-check tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::AdminAccount;
use crate::core::BanId;
use crate::core::BannedName;
use crate::core::EasterEgg;
use crate::core::EasterEggId;
use crate::core::Measurement;
use crate::core::MeasurementId;
use crate::core::MeasurementPatch;
use crate::core::NewAdmin;
use crate::core::NewBan;
use crate::core::NewEasterEgg;
use crate::core::NormalizedKey;
use crate::core::SessionToken;
use crate::core::Timestamp;
use crate::core::ValidationError;
use crate::core::validation;
use crate::core::validation::NAME_MAX_CHARS;
use crate::core::validation::NOTE_MAX_CHARS;
use crate::interfaces::CredentialError;
use crate::interfaces::CredentialHasher;
use crate::interfaces::EntropyError;
use crate::interfaces::SharedStore;
use crate::interfaces::StoreError;
use crate::runtime::sessions::SessionAuthenticator;
use crate::runtime::sessions::SessionIssueError;

/// Message for edits addressed to a missing measurement.
const MEASUREMENT_NOT_FOUND: &str = "measurement not found";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Admin console failures.
///
/// # Invariants
/// - Display output is safe to return to the caller except for `Store`,
///   `Entropy`, and `Credential`, which must be reported generically.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Request payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Bootstrap attempted after the setup gate closed.
    #[error("an admin account already exists")]
    SetupClosed,
    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// Addressed record does not exist.
    #[error("{0}")]
    NotFound(&'static str),
    /// Write would violate a uniqueness rule.
    #[error("{0}")]
    Conflict(&'static str),
    /// Store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Token generation failure.
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    /// Password hashing failure.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl From<SessionIssueError> for AdminError {
    fn from(err: SessionIssueError) -> Self {
        match err {
            SessionIssueError::Entropy(err) => Self::Entropy(err),
            SessionIssueError::Store(err) => Self::Store(err),
        }
    }
}

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Whether the admin console has been set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetupStatus {
    /// True once the setup gate has closed.
    pub ready: bool,
}

/// Result of a successful bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOutcome {
    /// Newly created admin.
    pub admin: AdminAccount,
    /// Initial session token.
    pub token: SessionToken,
}

// ============================================================================
// SECTION: Console
// ============================================================================

/// Admin operations over a shared store.
#[derive(Clone)]
pub struct AdminConsole {
    /// Backing store.
    store: SharedStore,
    /// Session issuer.
    sessions: SessionAuthenticator,
    /// Password hasher.
    hasher: Arc<dyn CredentialHasher>,
}

impl AdminConsole {
    /// Creates a console.
    #[must_use]
    pub fn new(
        store: SharedStore,
        sessions: SessionAuthenticator,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        Self {
            store,
            sessions,
            hasher,
        }
    }

    /// Reports whether setup has completed.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the lookup fails.
    pub fn status(&self) -> Result<SetupStatus, AdminError> {
        Ok(SetupStatus {
            ready: self.store.setup_locked()?,
        })
    }

    /// Creates the first admin and its initial session.
    ///
    /// The gate is checked before the payload, so a second attempt reports
    /// [`AdminError::SetupClosed`] even when its payload is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::SetupClosed`] once any admin has been created.
    pub fn bootstrap(
        &self,
        username: &str,
        password: &str,
        now: Timestamp,
    ) -> Result<BootstrapOutcome, AdminError> {
        if self.store.setup_locked()? {
            return Err(AdminError::SetupClosed);
        }
        let username = validation::admin_username(username)?;
        let password = validation::admin_password(password)?;
        let password_hash = self.hasher.hash(password)?;
        let token = self.sessions.generate_token()?;
        let admin = NewAdmin {
            username: username.to_string(),
            password_hash,
            created_at: now,
        };
        let expires_at = self.sessions.policy().expiry_from(now);
        match self.store.bootstrap_admin(&admin, &token, expires_at) {
            Ok((admin, _session)) => Ok(BootstrapOutcome {
                admin,
                token,
            }),
            Err(StoreError::Conflict(_)) => Err(AdminError::SetupClosed),
            Err(err) => Err(err.into()),
        }
    }

    /// Verifies credentials and issues a new session.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidCredentials`] for an unknown user or a
    /// wrong password. An unknown user still pays for one verification
    /// against the hasher's decoy hash.
    pub fn login(
        &self,
        username: &str,
        password: &str,
        now: Timestamp,
    ) -> Result<SessionToken, AdminError> {
        let (username, password) = validation::login_credentials(username, password)?;
        let Some(admin) = self.store.admin_by_username(username)? else {
            let _ = self.hasher.verify(password, self.hasher.decoy_hash());
            return Err(AdminError::InvalidCredentials);
        };
        if !self.hasher.verify(password, &admin.password_hash)? {
            return Err(AdminError::InvalidCredentials);
        }
        Ok(self.sessions.issue(admin.id, now)?)
    }

    // ------------------------------------------------------------------------
    // Banned names
    // ------------------------------------------------------------------------

    /// Lists bans, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the query fails.
    pub fn list_bans(&self) -> Result<Vec<BannedName>, AdminError> {
        Ok(self.store.list_bans()?)
    }

    /// Creates a ban, or updates the one with the same normalized value.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for a blank/oversized value or an
    /// oversized reason.
    pub fn upsert_ban(
        &self,
        value: &str,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<BannedName, AdminError> {
        let value = validation::required_text(value, "value", NAME_MAX_CHARS)?;
        let reason = validation::optional_text(reason, "reason", NOTE_MAX_CHARS)?;
        Ok(self.store.upsert_ban(&NewBan {
            value: value.to_string(),
            normalized_value: NormalizedKey::from_input(value),
            reason,
            created_at: now,
        })?)
    }

    /// Removes a ban.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for an unknown id.
    pub fn delete_ban(&self, id: BanId) -> Result<(), AdminError> {
        if self.store.delete_ban(id)? {
            Ok(())
        } else {
            Err(AdminError::NotFound("banned name not found"))
        }
    }

    // ------------------------------------------------------------------------
    // Easter eggs
    // ------------------------------------------------------------------------

    /// Lists easter eggs, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the query fails.
    pub fn list_easter_eggs(&self) -> Result<Vec<EasterEgg>, AdminError> {
        Ok(self.store.list_easter_eggs()?)
    }

    /// Creates an easter egg, or updates the one with the same trigger.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Validation`] for a bad trigger, value, or note.
    pub fn upsert_easter_egg(
        &self,
        trigger: &str,
        value: i64,
        note: Option<&str>,
        now: Timestamp,
    ) -> Result<EasterEgg, AdminError> {
        let trigger = validation::required_text(trigger, "trigger", NAME_MAX_CHARS)?;
        let value = validation::length_value(value, "value")?;
        let note = validation::optional_text(note, "note", NOTE_MAX_CHARS)?;
        Ok(self.store.upsert_easter_egg(&NewEasterEgg {
            trigger: trigger.to_string(),
            normalized_trigger: NormalizedKey::from_input(trigger),
            value,
            note,
            created_at: now,
        })?)
    }

    /// Removes an easter egg.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for an unknown id.
    pub fn delete_easter_egg(&self, id: EasterEggId) -> Result<(), AdminError> {
        if self.store.delete_easter_egg(id)? {
            Ok(())
        } else {
            Err(AdminError::NotFound("easter egg not found"))
        }
    }

    // ------------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------------

    /// Searches measurements by name; a blank query lists everything.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Store`] when the query fails.
    pub fn search_measurements(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<Measurement>, AdminError> {
        let query = query.map(str::trim).filter(|text| !text.is_empty());
        Ok(self.store.search_measurements(query)?)
    }

    /// Sets a measurement's value and optionally renames it.
    ///
    /// A rename rewrites the normalized key as well, so the record answers
    /// to the new name from then on.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] for an unknown id and
    /// [`AdminError::Conflict`] when the new name belongs to another record.
    pub fn edit_measurement(
        &self,
        id: MeasurementId,
        value: i64,
        name: Option<&str>,
        now: Timestamp,
    ) -> Result<Measurement, AdminError> {
        let value = validation::length_value(value, "value")?;
        let name = name.map(validation::measurement_name).transpose()?;
        let patch = MeasurementPatch {
            name: name.map(str::to_string),
            normalized_name: name.map(NormalizedKey::from_input),
            value: Some(value),
            updated_at: now,
        };
        match self.store.update_measurement(id, &patch) {
            Ok(updated) => Ok(updated),
            Err(StoreError::NotFound(_)) => Err(AdminError::NotFound(MEASUREMENT_NOT_FOUND)),
            Err(StoreError::Conflict(_)) => {
                Err(AdminError::Conflict("another measurement already uses this name"))
            }
            Err(err) => Err(err.into()),
        }
    }
}
