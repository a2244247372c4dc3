// crates/cosmic-ruler-config/src/config.rs
// ============================================================================
// Module: Cosmic Ruler Configuration
// Description: Configuration loading and validation for the Cosmic Ruler server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: cosmic-ruler-core, cosmic-ruler-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The path is taken from the caller, then `COSMIC_RULER_CONFIG`, then
//! `cosmic-ruler.toml` in the working directory. Missing or invalid
//! configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use cosmic_ruler_core::DEFAULT_LEADERBOARD_LIMIT;
use cosmic_ruler_core::SessionPolicy;
use cosmic_ruler_store_sqlite::SqliteStoreConfig;
use cosmic_ruler_store_sqlite::SqliteStoreMode;
use cosmic_ruler_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "cosmic-ruler.toml";
/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "COSMIC_RULER_CONFIG";
/// Maximum size of the config file in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Listener address used when `[server]` is omitted.
pub(crate) const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Default request body limit.
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
/// Upper bound for `server.max_body_bytes`.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 1024 * 1024;
/// Default `SQLite` busy timeout.
pub(crate) const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Longest session lifetime accepted (30 days).
pub(crate) const MAX_SESSION_TTL_HOURS: u32 = 720;
/// Largest leaderboard page accepted.
pub(crate) const MAX_LEADERBOARD_LIMIT: usize = 500;

// ============================================================================
// SECTION: Config Model
// ============================================================================

/// Cosmic Ruler server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RulerConfig {
    /// HTTP listener configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Durable store configuration.
    pub store: StoreConfig,
    /// Admin session configuration.
    #[serde(default)]
    pub sessions: SessionsConfig,
    /// Public leaderboard configuration.
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RulerConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.store.validate()?;
        self.sessions.validate()?;
        self.leaderboard.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP listener configuration.
///
/// An omitted `[server]` table listens on `127.0.0.1:8080`; a written table
/// must name `bind` explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:8080`.
    pub bind: String,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Parses the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must be set".to_string()));
        }
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes must be at most {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// Durable store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// `SQLite` database path.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl StoreConfig {
    /// Returns the `SQLite` backend configuration.
    #[must_use]
    pub fn sqlite_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
        }
    }

    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must be set".to_string()));
        }
        let text = self.path.to_string_lossy();
        if text.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("store path exceeds max length".to_string()));
        }
        for component in self.path.components() {
            let value = component.as_os_str().to_string_lossy();
            if value.len() > MAX_PATH_COMPONENT_LENGTH {
                return Err(ConfigError::Invalid("store path component too long".to_string()));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

/// Admin session configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SessionsConfig {
    /// Session lifetime in hours, slid forward on every authenticated call.
    #[serde(default = "default_session_ttl_hours")]
    pub ttl_hours: u32,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_session_ttl_hours(),
        }
    }
}

impl SessionsConfig {
    /// Returns the session policy for this configuration.
    #[must_use]
    pub fn policy(&self) -> SessionPolicy {
        SessionPolicy::from_hours(self.ttl_hours)
    }

    /// Validates session configuration.
    fn validate(self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_SESSION_TTL_HOURS).contains(&self.ttl_hours) {
            return Err(ConfigError::Invalid(format!(
                "sessions.ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Leaderboard
// ============================================================================

/// Public leaderboard configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LeaderboardConfig {
    /// Entries returned per direction.
    #[serde(default = "default_leaderboard_limit")]
    pub limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            limit: default_leaderboard_limit(),
        }
    }
}

impl LeaderboardConfig {
    /// Validates leaderboard configuration.
    fn validate(self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_LEADERBOARD_LIMIT).contains(&self.limit) {
            return Err(ConfigError::Invalid(format!(
                "leaderboard.limit must be between 1 and {MAX_LEADERBOARD_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Everything, including per-request traces.
    Trace,
    /// Debug diagnostics.
    Debug,
    /// Normal operation.
    #[default]
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: LogLevel,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the environment path is too long.
pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default request body limit.
const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Default `SQLite` busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Default session lifetime.
const fn default_session_ttl_hours() -> u32 {
    SessionPolicy::DEFAULT_TTL_HOURS
}

/// Default leaderboard page size.
const fn default_leaderboard_limit() -> usize {
    DEFAULT_LEADERBOARD_LIMIT
}

// ============================================================================
// SECTION: Tests
// ============================================================================
