// crates/cosmic-ruler-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example printed by `cosmic-ruler config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Cosmic Ruler configuration. The document lists
//! every key with its default so operators can copy and trim it.

/// Returns a canonical example `cosmic-ruler.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8080"
max_body_bytes = 65536

[store]
path = "data/cosmic-ruler.db"
busy_timeout_ms = 5000
journal_mode = "wal"
sync_mode = "full"

[sessions]
ttl_hours = 12

[leaderboard]
limit = 50

[logging]
level = "info"
"#,
    )
}
