// crates/cosmic-ruler-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Unit Tests
// Description: Integrity and behavior tests for the SQLite ruler store.
// Purpose: Validate path safety, schema versioning, uniqueness, ordering,
//          the setup gate, and session pruning.
// ============================================================================

//! ## Overview
//! Exercises [`SqliteRulerStore`] against real database files:
//! - Path safety checks (length/component/directory rejection)
//! - Schema version validation and reopen persistence
//! - Normalized-name uniqueness surfacing as conflicts
//! - Leaderboard, search, and moderation orderings
//! - One-shot setup gate and session lifecycle
//! - Concurrency safety (multi-threaded inserts)

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use cosmic_ruler_core::AdminStore;
use cosmic_ruler_core::MeasurementPatch;
use cosmic_ruler_core::MeasurementStore;
use cosmic_ruler_core::ModerationStore;
use cosmic_ruler_core::NewAdmin;
use cosmic_ruler_core::NewBan;
use cosmic_ruler_core::NewEasterEgg;
use cosmic_ruler_core::NewMeasurement;
use cosmic_ruler_core::NewSession;
use cosmic_ruler_core::NormalizedKey;
use cosmic_ruler_core::SessionToken;
use cosmic_ruler_core::SortOrder;
use cosmic_ruler_core::StoreError;
use cosmic_ruler_core::Timestamp;
use cosmic_ruler_store_sqlite::SqliteRulerStore;
use cosmic_ruler_store_sqlite::SqliteStoreConfig;
use cosmic_ruler_store_sqlite::SqliteStoreError;
use cosmic_ruler_store_sqlite::SqliteStoreMode;
use cosmic_ruler_store_sqlite::SqliteSyncMode;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn config_for_path(path: PathBuf) -> SqliteStoreConfig {
    SqliteStoreConfig {
        path,
        busy_timeout_ms: 5_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Normal,
    }
}

fn store_for(path: &Path) -> SqliteRulerStore {
    SqliteRulerStore::new(&config_for_path(path.to_path_buf())).expect("store init")
}

fn temp_store() -> (TempDir, SqliteRulerStore) {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("ruler.sqlite"));
    (temp, store)
}

const fn ts(millis: i64) -> Timestamp {
    Timestamp::from_unix_millis(millis)
}

fn new_measurement(name: &str, value: i32, at: i64) -> NewMeasurement {
    NewMeasurement {
        name: name.to_string(),
        normalized_name: NormalizedKey::from_input(name),
        value,
        created_at: ts(at),
    }
}

fn insert_listed(store: &SqliteRulerStore, name: &str, value: i32, at: i64) {
    let record = store.insert_measurement(&new_measurement(name, value, at)).unwrap();
    store.set_listed(record.id, true, ts(at)).unwrap();
}

fn new_admin(username: &str) -> NewAdmin {
    NewAdmin {
        username: username.to_string(),
        password_hash: format!("hashed:{username}"),
        created_at: ts(1_000),
    }
}

// ============================================================================
// SECTION: Path Safety
// ============================================================================

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let Err(err) = SqliteRulerStore::new(&config_for_path(temp.path().to_path_buf())) else {
        panic!("expected invalid directory path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_empty_path() {
    let Err(err) = SqliteRulerStore::new(&config_for_path(PathBuf::new())) else {
        panic!("expected empty path to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_rejects_overlong_component() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a".repeat(300));
    let Err(err) = SqliteRulerStore::new(&config_for_path(path)) else {
        panic!("expected overlong component to fail");
    };
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
}

#[test]
fn sqlite_store_creates_missing_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("deeper").join("ruler.sqlite");
    let _store = store_for(&path);
    assert!(path.exists());
}

// ============================================================================
// SECTION: Schema Versioning
// ============================================================================

#[test]
fn sqlite_store_rejects_unknown_schema_version() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ruler.sqlite");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE store_meta (version INTEGER NOT NULL);").unwrap();
    conn.execute("INSERT INTO store_meta (version) VALUES (?1)", params![999_i64]).unwrap();
    drop(conn);

    let Err(err) = SqliteRulerStore::new(&config_for_path(path)) else {
        panic!("expected schema mismatch to fail");
    };
    assert!(matches!(err, SqliteStoreError::VersionMismatch(_)));
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("ruler.sqlite");
    {
        let store = store_for(&path);
        store.insert_measurement(&new_measurement("Alice", 7, 10)).unwrap();
    }
    let reopened = store_for(&path);
    let found = reopened.measurement_by_key(&NormalizedKey::from_input("alice")).unwrap();
    assert_eq!(found.map(|m| m.value), Some(7));
}

// ============================================================================
// SECTION: Measurements
// ============================================================================

#[test]
fn duplicate_normalized_name_is_a_conflict() {
    let (_temp, store) = temp_store();
    store.insert_measurement(&new_measurement("Alice", 7, 10)).unwrap();
    let err = store.insert_measurement(&new_measurement("  ALICE ", 9, 20)).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
}

#[test]
fn update_of_unknown_measurement_is_not_found() {
    let (_temp, store) = temp_store();
    let record = store.insert_measurement(&new_measurement("Alice", 7, 10)).unwrap();
    let mut patch = MeasurementPatch::at(ts(20));
    patch.value = Some(1);
    let missing = cosmic_ruler_core::MeasurementId::new(record.id.get() + 100);
    let err = store.update_measurement(missing, &patch).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
}

#[test]
fn rename_onto_existing_key_is_a_conflict() {
    let (_temp, store) = temp_store();
    store.insert_measurement(&new_measurement("Alice", 7, 10)).unwrap();
    let bob = store.insert_measurement(&new_measurement("Bob", 3, 11)).unwrap();
    let mut patch = MeasurementPatch::at(ts(20));
    patch.name = Some("Alice".to_string());
    patch.normalized_name = Some(NormalizedKey::from_input("Alice"));
    let err = store.update_measurement(bob.id, &patch).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
}

#[test]
fn patch_writes_only_the_columns_it_sets() {
    let (_temp, store) = temp_store();
    let record = store.insert_measurement(&new_measurement("Alice", 7, 10)).unwrap();
    store.set_listed(record.id, true, ts(15)).unwrap();

    let mut rename = MeasurementPatch::at(ts(20));
    rename.name = Some("ALICE".to_string());
    let renamed = store.update_measurement(record.id, &rename).unwrap();
    assert_eq!(renamed.name, "ALICE");
    assert_eq!(renamed.normalized_name.as_str(), "alice");
    assert_eq!(renamed.value, 7);
    assert!(renamed.listed);
    assert_eq!(renamed.listed_at, Some(ts(15)));
    assert_eq!(renamed.updated_at, ts(20));

    let mut revalue = MeasurementPatch::at(ts(30));
    revalue.value = Some(-9_999);
    let revalued = store.update_measurement(record.id, &revalue).unwrap();
    assert_eq!(revalued.name, "ALICE");
    assert_eq!(revalued.value, -9_999);
    assert!(revalued.listed);
    assert_eq!(revalued.listed_at, Some(ts(15)));
}

#[test]
fn set_listed_decides_listed_at_from_the_stored_row() {
    let (_temp, store) = temp_store();
    let record = store.insert_measurement(&new_measurement("Alice", 7, 10)).unwrap();

    let listed = store.set_listed(record.id, true, ts(20)).unwrap();
    assert!(listed.listed);
    assert_eq!(listed.listed_at, Some(ts(20)));
    assert_eq!(listed.updated_at, ts(20));

    let relisted = store.set_listed(record.id, true, ts(30)).unwrap();
    assert_eq!(relisted.listed_at, Some(ts(20)), "relisting keeps the first stamp");
    assert_eq!(relisted.updated_at, ts(20), "a no-op leaves updated_at alone");

    let unlisted = store.set_listed(record.id, false, ts(40)).unwrap();
    assert!(!unlisted.listed);
    assert_eq!(unlisted.listed_at, None);
    assert_eq!(unlisted.updated_at, ts(40));

    let missing = cosmic_ruler_core::MeasurementId::new(record.id.get() + 100);
    let err = store.set_listed(missing, true, ts(50)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
}

#[test]
fn listed_counts_and_leaderboard_order() {
    let (_temp, store) = temp_store();
    insert_listed(&store, "low", 2, 1);
    insert_listed(&store, "mid-a", 10, 2);
    insert_listed(&store, "mid-b", 10, 3);
    insert_listed(&store, "high", 20, 4);
    store.insert_measurement(&new_measurement("hidden", 15, 5)).unwrap();

    assert_eq!(store.count_listed_below(10).unwrap(), 1);
    assert_eq!(store.count_listed_above(10).unwrap(), 1);

    let ascending: Vec<_> = store
        .listed_measurements(SortOrder::Ascending, 50)
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(ascending, vec!["low", "mid-a", "mid-b", "high"]);

    let descending: Vec<_> = store
        .listed_measurements(SortOrder::Descending, 2)
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(descending, vec!["high", "mid-a"]);
}

#[test]
fn search_is_case_insensitive_and_newest_first() {
    let (_temp, store) = temp_store();
    store.insert_measurement(&new_measurement("Stardust", 1, 10)).unwrap();
    store.insert_measurement(&new_measurement("stargazer", 2, 20)).unwrap();
    store.insert_measurement(&new_measurement("Comet", 3, 30)).unwrap();

    let names: Vec<_> =
        store.search_measurements(Some("STAR")).unwrap().into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["stargazer", "Stardust"]);

    let all = store.search_measurements(None).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "Comet");
}

#[test]
fn search_treats_like_wildcards_literally() {
    let (_temp, store) = temp_store();
    store.insert_measurement(&new_measurement("100%", 1, 10)).unwrap();
    store.insert_measurement(&new_measurement("1000", 2, 20)).unwrap();
    let names: Vec<_> =
        store.search_measurements(Some("0%")).unwrap().into_iter().map(|m| m.name).collect();
    assert_eq!(names, vec!["100%"]);
}

#[test]
fn sqlite_store_supports_concurrent_inserts() {
    let (_temp, store) = temp_store();
    let store = Arc::new(store);
    let mut handles = Vec::new();
    for i in 0 .. 4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            store.insert_measurement(&new_measurement(&format!("name-{i}"), i, 10)).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.search_measurements(None).unwrap().len(), 4);
}

// ============================================================================
// SECTION: Moderation
// ============================================================================

#[test]
fn ban_upsert_updates_in_place() {
    let (_temp, store) = temp_store();
    let first = store
        .upsert_ban(&NewBan {
            value: "Villain".to_string(),
            normalized_value: NormalizedKey::from_input("Villain"),
            reason: None,
            created_at: ts(10),
        })
        .unwrap();
    let second = store
        .upsert_ban(&NewBan {
            value: "VILLAIN".to_string(),
            normalized_value: NormalizedKey::from_input("VILLAIN"),
            reason: Some("no".to_string()),
            created_at: ts(20),
        })
        .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.value, "VILLAIN");
    assert_eq!(second.reason.as_deref(), Some("no"));
    assert_eq!(second.created_at, ts(10));
    assert_eq!(store.list_bans().unwrap().len(), 1);

    let third = store
        .upsert_ban(&NewBan {
            value: "villain".to_string(),
            normalized_value: NormalizedKey::from_input("villain"),
            reason: None,
            created_at: ts(30),
        })
        .unwrap();
    assert_eq!(third.value, "villain");
    assert_eq!(third.reason.as_deref(), Some("no"), "an omitted reason keeps the stored one");

    assert!(store.delete_ban(second.id).unwrap());
    assert!(!store.delete_ban(second.id).unwrap());
    assert!(store.ban_by_key(&NormalizedKey::from_input("villain")).unwrap().is_none());
}

#[test]
fn easter_eggs_list_newest_first() {
    let (_temp, store) = temp_store();
    for (index, trigger) in ["alpha", "beta", "gamma"].iter().enumerate() {
        let at = i64::try_from(index).unwrap() * 10;
        store
            .upsert_easter_egg(&NewEasterEgg {
                trigger: (*trigger).to_string(),
                normalized_trigger: NormalizedKey::from_input(trigger),
                value: 9_999,
                note: None,
                created_at: ts(at),
            })
            .unwrap();
    }
    let triggers: Vec<_> =
        store.list_easter_eggs().unwrap().into_iter().map(|egg| egg.trigger).collect();
    assert_eq!(triggers, vec!["gamma", "beta", "alpha"]);
    let egg = store.easter_egg_by_key(&NormalizedKey::from_input(" BETA ")).unwrap().unwrap();
    assert_eq!(egg.value, 9_999);
}

#[test]
fn easter_egg_upsert_without_note_keeps_the_stored_note() {
    let (_temp, store) = temp_store();
    let egg = |trigger: &str, value: i32, note: Option<&str>| NewEasterEgg {
        trigger: trigger.to_string(),
        normalized_trigger: NormalizedKey::from_input(trigger),
        value,
        note: note.map(str::to_string),
        created_at: ts(10),
    };
    let first = store.upsert_easter_egg(&egg("root", 42, Some("the answer"))).unwrap();
    let second = store.upsert_easter_egg(&egg("ROOT", 7, None)).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.trigger, "ROOT");
    assert_eq!(second.value, 7);
    assert_eq!(second.note.as_deref(), Some("the answer"));

    let third = store.upsert_easter_egg(&egg("root", 7, Some("replaced"))).unwrap();
    assert_eq!(third.note.as_deref(), Some("replaced"));
}

// ============================================================================
// SECTION: Admin and Sessions
// ============================================================================

#[test]
fn bootstrap_closes_setup_gate_once() {
    let (_temp, store) = temp_store();
    assert!(!store.setup_locked().unwrap());

    let (admin, session) = store
        .bootstrap_admin(&new_admin("root"), &SessionToken::new("tok-1"), ts(5_000))
        .unwrap();
    assert_eq!(session.admin_id, admin.id);
    assert!(store.setup_locked().unwrap());

    let err = store
        .bootstrap_admin(&new_admin("second"), &SessionToken::new("tok-2"), ts(5_000))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
    assert!(store.admin_by_username("second").unwrap().is_none());
}

#[test]
fn session_lookup_extend_and_prune() {
    let (_temp, store) = temp_store();
    let (admin, first) = store
        .bootstrap_admin(&new_admin("root"), &SessionToken::new("tok-1"), ts(1_000))
        .unwrap();
    store
        .insert_session(&NewSession {
            token: SessionToken::new("tok-2"),
            admin_id: admin.id,
            expires_at: ts(9_000),
        })
        .unwrap();

    let (session, owner) = store.session_with_admin(&SessionToken::new("tok-1")).unwrap().unwrap();
    assert_eq!(session.id, first.id);
    assert_eq!(owner.username, "root");

    store.extend_session(first.id, ts(2_000)).unwrap();
    let (session, _) = store.session_with_admin(&SessionToken::new("tok-1")).unwrap().unwrap();
    assert_eq!(session.expires_at, ts(2_000));

    assert_eq!(store.prune_sessions(ts(2_000)).unwrap(), 0);
    assert_eq!(store.prune_sessions(ts(2_001)).unwrap(), 1);
    assert!(store.session_with_admin(&SessionToken::new("tok-1")).unwrap().is_none());

    let err = store.extend_session(first.id, ts(3_000)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
}

#[test]
fn duplicate_session_token_is_a_conflict() {
    let (_temp, store) = temp_store();
    let (admin, _) = store
        .bootstrap_admin(&new_admin("root"), &SessionToken::new("tok-1"), ts(1_000))
        .unwrap();
    let err = store
        .insert_session(&NewSession {
            token: SessionToken::new("tok-1"),
            admin_id: admin.id,
            expires_at: ts(2_000),
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
}
