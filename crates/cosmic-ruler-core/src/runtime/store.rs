// crates/cosmic-ruler-core/src/runtime/store.rs
// ============================================================================
// Module: Cosmic Ruler In-Memory Store
// Description: Simple in-memory store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of every store interface
//! for tests and local demos. It enforces the same uniqueness rules as the
//! durable backend but is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::AdminAccount;
use crate::core::AdminId;
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
use crate::interfaces::AdminStore;
use crate::interfaces::MeasurementStore;
use crate::interfaces::ModerationStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: State
// ============================================================================

/// Tables guarded by a single mutex.
#[derive(Debug, Default)]
struct MemoryState {
    /// Last assigned row id, shared across tables.
    last_id: i64,
    /// Whether the setup gate has closed.
    setup_locked: bool,
    /// Measurements keyed by id.
    measurements: BTreeMap<i64, Measurement>,
    /// Bans keyed by id.
    bans: BTreeMap<i64, BannedName>,
    /// Easter eggs keyed by id.
    eggs: BTreeMap<i64, EasterEgg>,
    /// Admins keyed by id.
    admins: BTreeMap<i64, AdminAccount>,
    /// Sessions keyed by id.
    sessions: BTreeMap<i64, AdminSession>,
}

impl MemoryState {
    /// Allocates the next row id.
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the state.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Store("in-memory store mutex poisoned".to_string()))
    }
}

/// Returns true when `haystack` contains `needle` ignoring case.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// ============================================================================
// SECTION: Measurement Store
// ============================================================================

impl MeasurementStore for InMemoryStore {
    fn measurement_by_key(&self, key: &NormalizedKey) -> Result<Option<Measurement>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.measurements.values().find(|row| &row.normalized_name == key).cloned())
    }

    fn measurement_by_id(&self, id: MeasurementId) -> Result<Option<Measurement>, StoreError> {
        Ok(self.lock()?.measurements.get(&id.get()).cloned())
    }

    fn insert_measurement(&self, record: &NewMeasurement) -> Result<Measurement, StoreError> {
        let mut guard = self.lock()?;
        if guard.measurements.values().any(|row| row.normalized_name == record.normalized_name) {
            return Err(StoreError::Conflict(format!(
                "measurement already exists for {}",
                record.normalized_name
            )));
        }
        let id = guard.next_id();
        let measurement = Measurement {
            id: MeasurementId::new(id),
            name: record.name.clone(),
            normalized_name: record.normalized_name.clone(),
            value: record.value,
            listed: false,
            listed_at: None,
            created_at: record.created_at,
            updated_at: record.created_at,
        };
        guard.measurements.insert(id, measurement.clone());
        Ok(measurement)
    }

    fn update_measurement(
        &self,
        id: MeasurementId,
        patch: &MeasurementPatch,
    ) -> Result<Measurement, StoreError> {
        let mut guard = self.lock()?;
        if let Some(key) = &patch.normalized_name
            && guard.measurements.values().any(|row| row.id != id && &row.normalized_name == key)
        {
            return Err(StoreError::Conflict(format!("measurement already exists for {key}")));
        }
        let row = guard
            .measurements
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("measurement {id}")))?;
        if let Some(name) = &patch.name {
            row.name.clone_from(name);
        }
        if let Some(key) = &patch.normalized_name {
            row.normalized_name = key.clone();
        }
        if let Some(value) = patch.value {
            row.value = value;
        }
        row.updated_at = patch.updated_at;
        Ok(row.clone())
    }

    fn set_listed(
        &self,
        id: MeasurementId,
        listed: bool,
        at: Timestamp,
    ) -> Result<Measurement, StoreError> {
        let mut guard = self.lock()?;
        let row = guard
            .measurements
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("measurement {id}")))?;
        if row.listed != listed {
            row.listed = listed;
            row.listed_at = listed.then_some(at);
            row.updated_at = at;
        }
        Ok(row.clone())
    }

    fn count_listed_below(&self, value: i32) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count =
            guard.measurements.values().filter(|row| row.listed && row.value < value).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn count_listed_above(&self, value: i32) -> Result<u64, StoreError> {
        let guard = self.lock()?;
        let count =
            guard.measurements.values().filter(|row| row.listed && row.value > value).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn listed_measurements(
        &self,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<Measurement>, StoreError> {
        let guard = self.lock()?;
        let mut rows: Vec<Measurement> =
            guard.measurements.values().filter(|row| row.listed).cloned().collect();
        match order {
            SortOrder::Ascending => rows.sort_by_key(|row| (row.value, row.id)),
            SortOrder::Descending => {
                rows.sort_by(|a, b| b.value.cmp(&a.value).then(a.id.cmp(&b.id)));
            }
        }
        rows.truncate(limit);
        Ok(rows)
    }

    fn search_measurements(&self, query: Option<&str>) -> Result<Vec<Measurement>, StoreError> {
        let guard = self.lock()?;
        let needle = query.map(str::to_lowercase);
        let mut rows: Vec<Measurement> = guard
            .measurements
            .values()
            .filter(|row| {
                needle.as_deref().is_none_or(|needle| {
                    contains_folded(&row.name, needle)
                        || contains_folded(row.normalized_name.as_str(), needle)
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

// ============================================================================
// SECTION: Moderation Store
// ============================================================================

impl ModerationStore for InMemoryStore {
    fn ban_by_key(&self, key: &NormalizedKey) -> Result<Option<BannedName>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.bans.values().find(|row| &row.normalized_value == key).cloned())
    }

    fn list_bans(&self) -> Result<Vec<BannedName>, StoreError> {
        let guard = self.lock()?;
        let mut rows: Vec<BannedName> = guard.bans.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn upsert_ban(&self, ban: &NewBan) -> Result<BannedName, StoreError> {
        let mut guard = self.lock()?;
        if let Some(row) =
            guard.bans.values_mut().find(|row| row.normalized_value == ban.normalized_value)
        {
            row.value.clone_from(&ban.value);
            if ban.reason.is_some() {
                row.reason.clone_from(&ban.reason);
            }
            return Ok(row.clone());
        }
        let id = guard.next_id();
        let row = BannedName {
            id: BanId::new(id),
            value: ban.value.clone(),
            normalized_value: ban.normalized_value.clone(),
            reason: ban.reason.clone(),
            created_at: ban.created_at,
        };
        guard.bans.insert(id, row.clone());
        Ok(row)
    }

    fn delete_ban(&self, id: BanId) -> Result<bool, StoreError> {
        Ok(self.lock()?.bans.remove(&id.get()).is_some())
    }

    fn easter_egg_by_key(&self, key: &NormalizedKey) -> Result<Option<EasterEgg>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.eggs.values().find(|row| &row.normalized_trigger == key).cloned())
    }

    fn list_easter_eggs(&self) -> Result<Vec<EasterEgg>, StoreError> {
        let guard = self.lock()?;
        let mut rows: Vec<EasterEgg> = guard.eggs.values().cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn upsert_easter_egg(&self, egg: &NewEasterEgg) -> Result<EasterEgg, StoreError> {
        let mut guard = self.lock()?;
        if let Some(row) =
            guard.eggs.values_mut().find(|row| row.normalized_trigger == egg.normalized_trigger)
        {
            row.trigger.clone_from(&egg.trigger);
            row.value = egg.value;
            if egg.note.is_some() {
                row.note.clone_from(&egg.note);
            }
            return Ok(row.clone());
        }
        let id = guard.next_id();
        let row = EasterEgg {
            id: EasterEggId::new(id),
            trigger: egg.trigger.clone(),
            normalized_trigger: egg.normalized_trigger.clone(),
            value: egg.value,
            note: egg.note.clone(),
            created_at: egg.created_at,
        };
        guard.eggs.insert(id, row.clone());
        Ok(row)
    }

    fn delete_easter_egg(&self, id: EasterEggId) -> Result<bool, StoreError> {
        Ok(self.lock()?.eggs.remove(&id.get()).is_some())
    }
}

// ============================================================================
// SECTION: Admin Store
// ============================================================================

impl AdminStore for InMemoryStore {
    fn setup_locked(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.setup_locked)
    }

    fn bootstrap_admin(
        &self,
        admin: &NewAdmin,
        token: &SessionToken,
        expires_at: Timestamp,
    ) -> Result<(AdminAccount, AdminSession), StoreError> {
        let mut guard = self.lock()?;
        if guard.setup_locked {
            return Err(StoreError::Conflict("setup already completed".to_string()));
        }
        let admin_id = guard.next_id();
        let account = AdminAccount {
            id: AdminId::new(admin_id),
            username: admin.username.clone(),
            password_hash: admin.password_hash.clone(),
        };
        let session_id = guard.next_id();
        let session = AdminSession {
            id: SessionId::new(session_id),
            token: token.clone(),
            admin_id: account.id,
            expires_at,
        };
        guard.setup_locked = true;
        guard.admins.insert(admin_id, account.clone());
        guard.sessions.insert(session_id, session.clone());
        Ok((account, session))
    }

    fn admin_by_username(&self, username: &str) -> Result<Option<AdminAccount>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.admins.values().find(|row| row.username == username).cloned())
    }

    fn insert_session(&self, session: &NewSession) -> Result<AdminSession, StoreError> {
        let mut guard = self.lock()?;
        if !guard.admins.contains_key(&session.admin_id.get()) {
            return Err(StoreError::NotFound(format!("admin {}", session.admin_id)));
        }
        if guard.sessions.values().any(|row| row.token == session.token) {
            return Err(StoreError::Conflict("session token already exists".to_string()));
        }
        let id = guard.next_id();
        let row = AdminSession {
            id: SessionId::new(id),
            token: session.token.clone(),
            admin_id: session.admin_id,
            expires_at: session.expires_at,
        };
        guard.sessions.insert(id, row.clone());
        Ok(row)
    }

    fn session_with_admin(
        &self,
        token: &SessionToken,
    ) -> Result<Option<(AdminSession, AdminAccount)>, StoreError> {
        let guard = self.lock()?;
        let Some(session) = guard.sessions.values().find(|row| &row.token == token) else {
            return Ok(None);
        };
        let admin = guard.admins.get(&session.admin_id.get()).cloned().ok_or_else(|| {
            StoreError::Corrupt(format!("session {} references a missing admin", session.id))
        })?;
        Ok(Some((session.clone(), admin)))
    }

    fn extend_session(&self, id: SessionId, expires_at: Timestamp) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let row = guard
            .sessions
            .get_mut(&id.get())
            .ok_or_else(|| StoreError::NotFound(format!("session {id}")))?;
        row.expires_at = expires_at;
        Ok(())
    }

    fn delete_session(&self, id: SessionId) -> Result<bool, StoreError> {
        Ok(self.lock()?.sessions.remove(&id.get()).is_some())
    }

    fn prune_sessions(&self, now: Timestamp) -> Result<u64, StoreError> {
        let mut guard = self.lock()?;
        let before = guard.sessions.len();
        guard.sessions.retain(|_, row| row.expires_at >= now);
        let removed = before - guard.sessions.len();
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
