// crates/cosmic-ruler-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Ruler Store
// Description: Durable measurement, moderation, and admin store backed by SQLite WAL.
// Purpose: Persist every Cosmic Ruler table with constraint-enforced uniqueness.
// Dependencies: cosmic-ruler-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! One connection guarded by a mutex serves every call. Multi-statement
//! writes run inside a transaction so a failure leaves no partial rows.
//! Timestamps are stored as unix epoch milliseconds.
//!
//! Uniqueness of normalized names, banned values, triggers, usernames, and
//! session tokens is enforced by `UNIQUE` constraints; the setup gate is a
//! single-row table whose `CHECK (id = 1)` makes a second bootstrap fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use cosmic_ruler_core::AdminAccount;
use cosmic_ruler_core::AdminId;
use cosmic_ruler_core::AdminSession;
use cosmic_ruler_core::AdminStore;
use cosmic_ruler_core::BanId;
use cosmic_ruler_core::BannedName;
use cosmic_ruler_core::EasterEgg;
use cosmic_ruler_core::EasterEggId;
use cosmic_ruler_core::Measurement;
use cosmic_ruler_core::MeasurementId;
use cosmic_ruler_core::MeasurementPatch;
use cosmic_ruler_core::MeasurementStore;
use cosmic_ruler_core::ModerationStore;
use cosmic_ruler_core::NewAdmin;
use cosmic_ruler_core::NewBan;
use cosmic_ruler_core::NewEasterEgg;
use cosmic_ruler_core::NewMeasurement;
use cosmic_ruler_core::NewSession;
use cosmic_ruler_core::NormalizedKey;
use cosmic_ruler_core::SessionId;
use cosmic_ruler_core::SessionToken;
use cosmic_ruler_core::SortOrder;
use cosmic_ruler_core::StoreError;
use cosmic_ruler_core::Timestamp;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::TransactionBehavior;
use rusqlite::ffi;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
pub const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Column list for measurement reads.
const MEASUREMENT_COLUMNS: &str =
    "id, name, normalized_name, value, listed, listed_at, created_at, updated_at";
/// Column list for ban reads.
const BAN_COLUMNS: &str = "id, value, normalized_value, reason, created_at";
/// Column list for easter-egg reads.
const EGG_COLUMNS: &str = "id, trigger_text, normalized_trigger, value, note, created_at";

/// Schema for a fresh database.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS setup_state (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    locked_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS measurements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    normalized_name TEXT NOT NULL UNIQUE,
    value INTEGER NOT NULL CHECK (value BETWEEN -9999 AND 9999),
    listed INTEGER NOT NULL DEFAULT 0,
    listed_at INTEGER,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_measurements_listed_value
    ON measurements (listed, value);
CREATE INDEX IF NOT EXISTS idx_measurements_updated_at
    ON measurements (updated_at);
CREATE TABLE IF NOT EXISTS banned_names (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value TEXT NOT NULL,
    normalized_value TEXT NOT NULL UNIQUE,
    reason TEXT,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS easter_eggs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trigger_text TEXT NOT NULL,
    normalized_trigger TEXT NOT NULL UNIQUE,
    value INTEGER NOT NULL CHECK (value BETWEEN -9999 AND 9999),
    note TEXT,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS admin_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    token TEXT NOT NULL UNIQUE,
    admin_id INTEGER NOT NULL,
    expires_at INTEGER NOT NULL,
    FOREIGN KEY (admin_id) REFERENCES admins(id) ON DELETE CASCADE
);
CREATE INDEX IF NOT EXISTS idx_admin_sessions_expires_at
    ON admin_sessions (expires_at);
";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config with default pragmas for `path`.
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A uniqueness constraint or the setup gate rejected the write.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// The addressed row does not exist.
    #[error("sqlite store row not found: {0}")]
    NotFound(String),
    /// Stored data failed integrity checks.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid configuration or input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::Corrupt(message) | SqliteStoreError::Invalid(message) => {
                Self::Corrupt(message)
            }
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
        }
    }
}

/// Maps an engine error, recognizing constraint violations.
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    let extended = match err {
        rusqlite::Error::SqliteFailure(code, _) => Some(code.extended_code),
        _ => None,
    };
    match extended {
        Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY) => {
            SqliteStoreError::Conflict(err.to_string())
        }
        Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => SqliteStoreError::NotFound(err.to_string()),
        _ => SqliteStoreError::Db(err.to_string()),
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed store with WAL support.
#[derive(Clone)]
pub struct SqliteRulerStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRulerStore {
    /// Opens an `SQLite`-backed store, creating the schema when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Runs `op` with exclusive access to the connection.
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| StoreError::Store("sqlite store mutex poisoned".to_string()))?;
        op(&mut guard).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Measurement Store
// ============================================================================

impl MeasurementStore for SqliteRulerStore {
    fn measurement_by_key(&self, key: &NormalizedKey) -> Result<Option<Measurement>, StoreError> {
        self.with_connection(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {MEASUREMENT_COLUMNS} FROM measurements WHERE normalized_name = ?1"
                ),
                params![key.as_str()],
                measurement_from_row,
            )
            .optional()
            .map_err(|err| db_error(&err))
        })
    }

    fn measurement_by_id(&self, id: MeasurementId) -> Result<Option<Measurement>, StoreError> {
        self.with_connection(|conn| select_measurement(conn, id))
    }

    fn insert_measurement(&self, record: &NewMeasurement) -> Result<Measurement, StoreError> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO measurements (name, normalized_name, value, listed, listed_at, \
                 created_at, updated_at) VALUES (?1, ?2, ?3, 0, NULL, ?4, ?4)",
                params![
                    record.name,
                    record.normalized_name.as_str(),
                    record.value,
                    record.created_at.as_unix_millis()
                ],
            )
            .map_err(|err| db_error(&err))?;
            Ok(Measurement {
                id: MeasurementId::new(conn.last_insert_rowid()),
                name: record.name.clone(),
                normalized_name: record.normalized_name.clone(),
                value: record.value,
                listed: false,
                listed_at: None,
                created_at: record.created_at,
                updated_at: record.created_at,
            })
        })
    }

    fn update_measurement(
        &self,
        id: MeasurementId,
        patch: &MeasurementPatch,
    ) -> Result<Measurement, StoreError> {
        self.with_connection(|conn| {
            let tx = conn.transaction().map_err(|err| db_error(&err))?;
            let changed = tx
                .execute(
                    "UPDATE measurements SET name = COALESCE(?1, name), normalized_name = \
                     COALESCE(?2, normalized_name), value = COALESCE(?3, value), updated_at = ?4 \
                     WHERE id = ?5",
                    params![
                        patch.name.as_deref(),
                        patch.normalized_name.as_ref().map(NormalizedKey::as_str),
                        patch.value,
                        patch.updated_at.as_unix_millis(),
                        id.get()
                    ],
                )
                .map_err(|err| db_error(&err))?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("measurement {id}")));
            }
            let updated = select_measurement(&tx, id)?.ok_or_else(|| {
                SqliteStoreError::Corrupt(format!("measurement {id} vanished during update"))
            })?;
            tx.commit().map_err(|err| db_error(&err))?;
            Ok(updated)
        })
    }

    fn set_listed(
        &self,
        id: MeasurementId,
        listed: bool,
        at: Timestamp,
    ) -> Result<Measurement, StoreError> {
        self.with_connection(|conn| {
            let tx = conn.transaction().map_err(|err| db_error(&err))?;
            let changed = tx
                .execute(
                    "UPDATE measurements SET listed_at = CASE WHEN ?1 = 0 THEN NULL WHEN listed \
                     = 1 THEN listed_at ELSE ?2 END, updated_at = CASE WHEN listed = ?1 THEN \
                     updated_at ELSE ?2 END, listed = ?1 WHERE id = ?3",
                    params![listed, at.as_unix_millis(), id.get()],
                )
                .map_err(|err| db_error(&err))?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("measurement {id}")));
            }
            let updated = select_measurement(&tx, id)?.ok_or_else(|| {
                SqliteStoreError::Corrupt(format!("measurement {id} vanished during update"))
            })?;
            tx.commit().map_err(|err| db_error(&err))?;
            Ok(updated)
        })
    }

    fn count_listed_below(&self, value: i32) -> Result<u64, StoreError> {
        self.with_connection(|conn| {
            count_rows(
                conn,
                "SELECT COUNT(*) FROM measurements WHERE listed = 1 AND value < ?1",
                value,
            )
        })
    }

    fn count_listed_above(&self, value: i32) -> Result<u64, StoreError> {
        self.with_connection(|conn| {
            count_rows(
                conn,
                "SELECT COUNT(*) FROM measurements WHERE listed = 1 AND value > ?1",
                value,
            )
        })
    }

    fn listed_measurements(
        &self,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Measurement>, StoreError> {
        let direction = match order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {MEASUREMENT_COLUMNS} FROM measurements WHERE listed = 1 ORDER BY \
                     value {direction}, id ASC LIMIT ?1"
                ))
                .map_err(|err| db_error(&err))?;
            let rows = stmt
                .query_map(params![limit], measurement_from_row)
                .map_err(|err| db_error(&err))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|err| db_error(&err))
        })
    }

    fn search_measurements(&self, query: Option<&str>) -> Result<Vec<Measurement>, StoreError> {
        let pattern = query.map(|text| format!("%{}%", escape_like(&text.to_lowercase())));
        self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {MEASUREMENT_COLUMNS} FROM measurements WHERE ?1 IS NULL OR \
                     normalized_name LIKE ?1 ESCAPE '\\' OR name LIKE ?1 ESCAPE '\\' ORDER BY \
                     updated_at DESC, id DESC"
                ))
                .map_err(|err| db_error(&err))?;
            let rows = stmt
                .query_map(params![pattern], measurement_from_row)
                .map_err(|err| db_error(&err))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|err| db_error(&err))
        })
    }
}

// ============================================================================
// SECTION: Moderation Store
// ============================================================================

impl ModerationStore for SqliteRulerStore {
    fn ban_by_key(&self, key: &NormalizedKey) -> Result<Option<BannedName>, StoreError> {
        self.with_connection(|conn| select_ban(conn, key))
    }

    fn list_bans(&self) -> Result<Vec<BannedName>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {BAN_COLUMNS} FROM banned_names ORDER BY created_at DESC, id DESC"
                ))
                .map_err(|err| db_error(&err))?;
            let rows = stmt.query_map(params![], ban_from_row).map_err(|err| db_error(&err))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|err| db_error(&err))
        })
    }

    fn upsert_ban(&self, ban: &NewBan) -> Result<BannedName, StoreError> {
        self.with_connection(|conn| {
            let tx = conn.transaction().map_err(|err| db_error(&err))?;
            tx.execute(
                "INSERT INTO banned_names (value, normalized_value, reason, created_at) VALUES \
                 (?1, ?2, ?3, ?4) ON CONFLICT(normalized_value) DO UPDATE SET value = \
                 excluded.value, reason = COALESCE(excluded.reason, reason)",
                params![
                    ban.value,
                    ban.normalized_value.as_str(),
                    ban.reason,
                    ban.created_at.as_unix_millis()
                ],
            )
            .map_err(|err| db_error(&err))?;
            let stored = select_ban(&tx, &ban.normalized_value)?.ok_or_else(|| {
                SqliteStoreError::Corrupt("ban missing after upsert".to_string())
            })?;
            tx.commit().map_err(|err| db_error(&err))?;
            Ok(stored)
        })
    }

    fn delete_ban(&self, id: BanId) -> Result<bool, StoreError> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM banned_names WHERE id = ?1", params![id.get()])
                .map(|changed| changed > 0)
                .map_err(|err| db_error(&err))
        })
    }

    fn easter_egg_by_key(&self, key: &NormalizedKey) -> Result<Option<EasterEgg>, StoreError> {
        self.with_connection(|conn| select_egg(conn, key))
    }

    fn list_easter_eggs(&self) -> Result<Vec<EasterEgg>, StoreError> {
        self.with_connection(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {EGG_COLUMNS} FROM easter_eggs ORDER BY created_at DESC, id DESC"
                ))
                .map_err(|err| db_error(&err))?;
            let rows = stmt.query_map(params![], egg_from_row).map_err(|err| db_error(&err))?;
            rows.collect::<Result<Vec<_>, _>>().map_err(|err| db_error(&err))
        })
    }

    fn upsert_easter_egg(&self, egg: &NewEasterEgg) -> Result<EasterEgg, StoreError> {
        self.with_connection(|conn| {
            let tx = conn.transaction().map_err(|err| db_error(&err))?;
            tx.execute(
                "INSERT INTO easter_eggs (trigger_text, normalized_trigger, value, note, \
                 created_at) VALUES (?1, ?2, ?3, ?4, ?5) ON CONFLICT(normalized_trigger) DO \
                 UPDATE SET trigger_text = excluded.trigger_text, value = excluded.value, note = \
                 COALESCE(excluded.note, note)",
                params![
                    egg.trigger,
                    egg.normalized_trigger.as_str(),
                    egg.value,
                    egg.note,
                    egg.created_at.as_unix_millis()
                ],
            )
            .map_err(|err| db_error(&err))?;
            let stored = select_egg(&tx, &egg.normalized_trigger)?.ok_or_else(|| {
                SqliteStoreError::Corrupt("easter egg missing after upsert".to_string())
            })?;
            tx.commit().map_err(|err| db_error(&err))?;
            Ok(stored)
        })
    }

    fn delete_easter_egg(&self, id: EasterEggId) -> Result<bool, StoreError> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM easter_eggs WHERE id = ?1", params![id.get()])
                .map(|changed| changed > 0)
                .map_err(|err| db_error(&err))
        })
    }
}

// ============================================================================
// SECTION: Admin Store
// ============================================================================

impl AdminStore for SqliteRulerStore {
    fn setup_locked(&self) -> Result<bool, StoreError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT EXISTS(SELECT 1 FROM setup_state)", params![], |row| row.get(0))
                .map_err(|err| db_error(&err))
        })
    }

    fn bootstrap_admin(
        &self,
        admin: &NewAdmin,
        token: &SessionToken,
        expires_at: Timestamp,
    ) -> Result<(AdminAccount, AdminSession), StoreError> {
        self.with_connection(|conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|err| db_error(&err))?;
            tx.execute(
                "INSERT INTO setup_state (id, locked_at) VALUES (1, ?1)",
                params![admin.created_at.as_unix_millis()],
            )
            .map_err(|err| match db_error(&err) {
                SqliteStoreError::Conflict(_) => {
                    SqliteStoreError::Conflict("setup already completed".to_string())
                }
                other => other,
            })?;
            tx.execute(
                "INSERT INTO admins (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
                params![admin.username, admin.password_hash, admin.created_at.as_unix_millis()],
            )
            .map_err(|err| db_error(&err))?;
            let account = AdminAccount {
                id: AdminId::new(tx.last_insert_rowid()),
                username: admin.username.clone(),
                password_hash: admin.password_hash.clone(),
            };
            tx.execute(
                "INSERT INTO admin_sessions (token, admin_id, expires_at) VALUES (?1, ?2, ?3)",
                params![token.as_str(), account.id.get(), expires_at.as_unix_millis()],
            )
            .map_err(|err| db_error(&err))?;
            let session = AdminSession {
                id: SessionId::new(tx.last_insert_rowid()),
                token: token.clone(),
                admin_id: account.id,
                expires_at,
            };
            tx.commit().map_err(|err| db_error(&err))?;
            Ok((account, session))
        })
    }

    fn admin_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT id, username, password_hash FROM admins WHERE username = ?1",
                params![username],
                |row| {
                    Ok(AdminAccount {
                        id: AdminId::new(row.get(0)?),
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|err| db_error(&err))
        })
    }

    fn insert_session(&self, session: &NewSession) -> Result<AdminSession, StoreError> {
        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO admin_sessions (token, admin_id, expires_at) VALUES (?1, ?2, ?3)",
                params![
                    session.token.as_str(),
                    session.admin_id.get(),
                    session.expires_at.as_unix_millis()
                ],
            )
            .map_err(|err| db_error(&err))?;
            Ok(AdminSession {
                id: SessionId::new(conn.last_insert_rowid()),
                token: session.token.clone(),
                admin_id: session.admin_id,
                expires_at: session.expires_at,
            })
        })
    }

    fn session_with_admin(
        &self,
        token: &SessionToken,
    ) -> Result<Option<(AdminSession, AdminAccount)>, StoreError> {
        self.with_connection(|conn| {
            conn.query_row(
                "SELECT s.id, s.token, s.expires_at, a.id, a.username, a.password_hash FROM \
                 admin_sessions s JOIN admins a ON a.id = s.admin_id WHERE s.token = ?1",
                params![token.as_str()],
                |row| {
                    let admin = AdminAccount {
                        id: AdminId::new(row.get(3)?),
                        username: row.get(4)?,
                        password_hash: row.get(5)?,
                    };
                    let session = AdminSession {
                        id: SessionId::new(row.get(0)?),
                        token: SessionToken::new(row.get::<_, String>(1)?),
                        admin_id: admin.id,
                        expires_at: Timestamp::from_unix_millis(row.get(2)?),
                    };
                    Ok((session, admin))
                },
            )
            .optional()
            .map_err(|err| db_error(&err))
        })
    }

    fn extend_session(&self, id: SessionId, expires_at: Timestamp) -> Result<(), StoreError> {
        self.with_connection(|conn| {
            let changed = conn
                .execute(
                    "UPDATE admin_sessions SET expires_at = ?1 WHERE id = ?2",
                    params![expires_at.as_unix_millis(), id.get()],
                )
                .map_err(|err| db_error(&err))?;
            if changed == 0 {
                return Err(SqliteStoreError::NotFound(format!("session {id}")));
            }
            Ok(())
        })
    }

    fn delete_session(&self, id: SessionId) -> Result<bool, StoreError> {
        self.with_connection(|conn| {
            conn.execute("DELETE FROM admin_sessions WHERE id = ?1", params![id.get()])
                .map(|changed| changed > 0)
                .map_err(|err| db_error(&err))
        })
    }

    fn prune_sessions(&self, now: Timestamp) -> Result<u64, StoreError> {
        self.with_connection(|conn| {
            let removed = conn
                .execute(
                    "DELETE FROM admin_sessions WHERE expires_at < ?1",
                    params![now.as_unix_millis()],
                )
                .map_err(|err| db_error(&err))?;
            Ok(u64::try_from(removed).unwrap_or(u64::MAX))
        })
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Maps a row selected with [`MEASUREMENT_COLUMNS`].
fn measurement_from_row(row: &Row<'_>) -> rusqlite::Result<Measurement> {
    Ok(Measurement {
        id: MeasurementId::new(row.get(0)?),
        name: row.get(1)?,
        normalized_name: NormalizedKey::from_stored(&row.get::<_, String>(2)?),
        value: row.get(3)?,
        listed: row.get(4)?,
        listed_at: row.get::<_, Option<i64>>(5)?.map(Timestamp::from_unix_millis),
        created_at: Timestamp::from_unix_millis(row.get(6)?),
        updated_at: Timestamp::from_unix_millis(row.get(7)?),
    })
}

/// Maps a row selected with [`BAN_COLUMNS`].
fn ban_from_row(row: &Row<'_>) -> rusqlite::Result<BannedName> {
    Ok(BannedName {
        id: BanId::new(row.get(0)?),
        value: row.get(1)?,
        normalized_value: NormalizedKey::from_stored(&row.get::<_, String>(2)?),
        reason: row.get(3)?,
        created_at: Timestamp::from_unix_millis(row.get(4)?),
    })
}

/// Maps a row selected with [`EGG_COLUMNS`].
fn egg_from_row(row: &Row<'_>) -> rusqlite::Result<EasterEgg> {
    Ok(EasterEgg {
        id: EasterEggId::new(row.get(0)?),
        trigger: row.get(1)?,
        normalized_trigger: NormalizedKey::from_stored(&row.get::<_, String>(2)?),
        value: row.get(3)?,
        note: row.get(4)?,
        created_at: Timestamp::from_unix_millis(row.get(5)?),
    })
}

/// Loads one measurement by id.
fn select_measurement(
    conn: &Connection,
    id: MeasurementId,
) -> Result<Option<Measurement>, SqliteStoreError> {
    conn.query_row(
        &format!("SELECT {MEASUREMENT_COLUMNS} FROM measurements WHERE id = ?1"),
        params![id.get()],
        measurement_from_row,
    )
    .optional()
    .map_err(|err| db_error(&err))
}

/// Loads one ban by normalized value.
fn select_ban(
    conn: &Connection,
    key: &NormalizedKey,
) -> Result<Option<BannedName>, SqliteStoreError> {
    conn.query_row(
        &format!("SELECT {BAN_COLUMNS} FROM banned_names WHERE normalized_value = ?1"),
        params![key.as_str()],
        ban_from_row,
    )
    .optional()
    .map_err(|err| db_error(&err))
}

/// Loads one easter egg by normalized trigger.
fn select_egg(
    conn: &Connection,
    key: &NormalizedKey,
) -> Result<Option<EasterEgg>, SqliteStoreError> {
    conn.query_row(
        &format!("SELECT {EGG_COLUMNS} FROM easter_eggs WHERE normalized_trigger = ?1"),
        params![key.as_str()],
        egg_from_row,
    )
    .optional()
    .map_err(|err| db_error(&err))
}

/// Runs a single-parameter `COUNT(*)` query.
fn count_rows(conn: &Connection, sql: &str, value: i32) -> Result<u64, SqliteStoreError> {
    let count: i64 =
        conn.query_row(sql, params![value], |row| row.get(0)).map_err(|err| db_error(&err))?;
    u64::try_from(count).map_err(|_| SqliteStoreError::Corrupt(format!("negative count {count}")))
}

/// Escapes `LIKE` wildcards so user queries match literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(SCHEMA_SQL).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
