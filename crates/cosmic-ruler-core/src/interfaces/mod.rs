// crates/cosmic-ruler-core/src/interfaces/mod.rs
// ============================================================================
// Module: Cosmic Ruler Interfaces
// Description: Backend-agnostic interfaces for persistence, entropy, and hashing.
// Purpose: Define the contract surfaces used by the Cosmic Ruler runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the runtime reaches the outside world without
//! embedding backend details. Stores own every at-most-one-row invariant and
//! report a violated one as [`StoreError::Conflict`]; the runtime never
//! checks-then-inserts without being prepared for that error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::AdminAccount;
use crate::core::AdminSession;
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
use crate::core::NewMeasurement;
use crate::core::NewSession;
use crate::core::NormalizedKey;
use crate::core::SessionId;
use crate::core::SessionToken;
use crate::core::SortOrder;
use crate::core::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Store errors shared by every persistence interface.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Conflict` is reserved for violated uniqueness or one-way gate checks.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint or one-way gate rejected the write.
    #[error("store conflict: {0}")]
    Conflict(String),
    /// The addressed row does not exist.
    #[error("store row not found: {0}")]
    NotFound(String),
    /// Stored data failed integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store reported an error.
    #[error("store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Measurement Store
// ============================================================================

/// Persistent mapping from normalized name to measurement.
pub trait MeasurementStore {
    /// Loads the measurement for a normalized name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn measurement_by_key(&self, key: &NormalizedKey) -> Result<Option<Measurement>, StoreError>;

    /// Loads a measurement by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn measurement_by_id(&self, id: MeasurementId) -> Result<Option<Measurement>, StoreError>;

    /// Inserts a first-ever measurement, unlisted.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the normalized name already exists.
    fn insert_measurement(&self, record: &NewMeasurement) -> Result<Measurement, StoreError>;

    /// Writes the columns a patch sets, in one statement, and returns the
    /// row as stored afterwards. Columns the patch leaves unset keep
    /// whatever value the store holds at write time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::Conflict`] when the new normalized name belongs to
    /// another measurement.
    fn update_measurement(
        &self,
        id: MeasurementId,
        patch: &MeasurementPatch,
    ) -> Result<Measurement, StoreError>;

    /// Sets leaderboard visibility, deciding `listed_at` against the stored
    /// row: listing an unlisted row stamps `at`, relisting keeps the stamp,
    /// and unlisting clears it. A call that changes nothing leaves
    /// `updated_at` alone.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id.
    fn set_listed(
        &self,
        id: MeasurementId,
        listed: bool,
        at: Timestamp,
    ) -> Result<Measurement, StoreError>;

    /// Counts listed measurements with a value strictly below `value`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn count_listed_below(&self, value: i32) -> Result<u64, StoreError>;

    /// Counts listed measurements with a value strictly above `value`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn count_listed_above(&self, value: i32) -> Result<u64, StoreError>;

    /// Returns up to `limit` listed measurements sorted by value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn listed_measurements(
        &self,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Measurement>, StoreError>;

    /// Returns measurements whose name or normalized name contains `query`
    /// case-insensitively, most recently updated first. `None` lists all.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn search_measurements(&self, query: Option<&str>) -> Result<Vec<Measurement>, StoreError>;
}

// ============================================================================
// SECTION: Moderation Store
// ============================================================================

/// Banned strings and easter-egg overrides.
pub trait ModerationStore {
    /// Loads the ban for a normalized key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn ban_by_key(&self, key: &NormalizedKey) -> Result<Option<BannedName>, StoreError>;

    /// Lists bans, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_bans(&self) -> Result<Vec<BannedName>, StoreError>;

    /// Inserts a ban or updates the display value and reason of the existing
    /// ban with the same normalized key. A `None` reason keeps the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_ban(&self, ban: &NewBan) -> Result<BannedName, StoreError>;

    /// Deletes a ban. Returns false when the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn delete_ban(&self, id: BanId) -> Result<bool, StoreError>;

    /// Loads the easter egg for a normalized key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn easter_egg_by_key(&self, key: &NormalizedKey) -> Result<Option<EasterEgg>, StoreError>;

    /// Lists easter eggs, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_easter_eggs(&self) -> Result<Vec<EasterEgg>, StoreError>;

    /// Inserts an easter egg or updates the trigger, value, and note of the
    /// existing egg with the same normalized key. A `None` note keeps the
    /// stored one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn upsert_easter_egg(&self, egg: &NewEasterEgg) -> Result<EasterEgg, StoreError>;

    /// Deletes an easter egg. Returns false when the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn delete_easter_egg(&self, id: EasterEggId) -> Result<bool, StoreError>;
}

// ============================================================================
// SECTION: Admin Store
// ============================================================================

/// Admin accounts, the one-way setup gate, and bearer sessions.
pub trait AdminStore {
    /// Returns true once the setup gate has been closed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn setup_locked(&self) -> Result<bool, StoreError>;

    /// Atomically closes the setup gate, creates the first admin, and opens
    /// its initial session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the gate is already closed.
    fn bootstrap_admin(
        &self,
        admin: &NewAdmin,
        token: &SessionToken,
        expires_at: Timestamp,
    ) -> Result<(AdminAccount, AdminSession), StoreError>;

    /// Loads an admin by exact username.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn admin_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError>;

    /// Stores a new session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when the token already exists and
    /// [`StoreError::NotFound`] when the admin does not.
    fn insert_session(&self, session: &NewSession) -> Result<AdminSession, StoreError>;

    /// Loads a session and its owning admin by token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn session_with_admin(
        &self,
        token: &SessionToken,
    ) -> Result<Option<(AdminSession, AdminAccount)>, StoreError>;

    /// Moves a session's expiry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the session no longer exists.
    fn extend_session(&self, id: SessionId, expires_at: Timestamp) -> Result<(), StoreError>;

    /// Deletes a session. Returns false when it was already gone.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn delete_session(&self, id: SessionId) -> Result<bool, StoreError>;

    /// Deletes every session with `expires_at < now` and returns the count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn prune_sessions(&self, now: Timestamp) -> Result<u64, StoreError>;
}

// ============================================================================
// SECTION: Combined Store
// ============================================================================

/// Every persistence surface the runtime needs, in one object.
pub trait RulerStore: MeasurementStore + ModerationStore + AdminStore + Send + Sync {}

impl<T> RulerStore for T where T: MeasurementStore + ModerationStore + AdminStore + Send + Sync {}

/// Shared handle to a store implementation.
pub type SharedStore = Arc<dyn RulerStore>;

// ============================================================================
// SECTION: Entropy
// ============================================================================

/// Entropy source failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EntropyError {
    /// The random source could not produce bytes.
    #[error("entropy source unavailable: {0}")]
    Unavailable(String),
}

/// Raw randomness for fresh length draws.
pub trait LengthSource: Send + Sync {
    /// Returns 32 uniformly distributed bits.
    fn next_u32(&self) -> u32;
}

/// High-entropy opaque session tokens.
pub trait TokenSource: Send + Sync {
    /// Generates a new token.
    ///
    /// # Errors
    ///
    /// Returns [`EntropyError`] when no secure randomness is available.
    fn new_token(&self) -> Result<SessionToken, EntropyError>;
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Password hashing failures.
///
/// # Invariants
/// - Messages never include the password.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
    /// The stored hash could not be parsed.
    #[error("stored password hash is malformed: {0}")]
    Malformed(String),
}

/// One-way password hashing with a work factor.
pub trait CredentialHasher: Send + Sync {
    /// Hashes a password into a self-describing string.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when hashing fails.
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Checks a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when the stored hash is unusable.
    fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, CredentialError>;

    /// Returns a well-formed hash at production cost that no password
    /// matches. Logins for unknown usernames verify against it so both
    /// rejection paths take the same time.
    fn decoy_hash(&self) -> &str;
}
