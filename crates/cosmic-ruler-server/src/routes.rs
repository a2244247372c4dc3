// crates/cosmic-ruler-server/src/routes.rs
// ============================================================================
// Module: HTTP Routes
// Description: JSON endpoints for measuring, the leaderboard, and admin curation.
// Purpose: Translate HTTP requests into runtime calls and back.
// Dependencies: cosmic-ruler-core, axum, serde, serde_json, tokio, tracing
// ============================================================================

//! ## Overview
//! Each endpoint is split into an async axum handler and a synchronous core
//! taking the request body and the current [`Timestamp`]. The core runs on
//! the blocking pool because the store, argon2, and the OS entropy source all
//! block. Request bodies are parsed from raw bytes so malformed JSON gets the
//! same `{"error": ...}` envelope as every other failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use cosmic_ruler_core::AdminAccount;
use cosmic_ruler_core::AdminError;
use cosmic_ruler_core::BanId;
use cosmic_ruler_core::BannedName;
use cosmic_ruler_core::EasterEgg;
use cosmic_ruler_core::EasterEggId;
use cosmic_ruler_core::Leaderboard;
use cosmic_ruler_core::Measurement;
use cosmic_ruler_core::MeasurementId;
use cosmic_ruler_core::Ranks;
use cosmic_ruler_core::SetupStatus;
use cosmic_ruler_core::Timestamp;
use cosmic_ruler_core::ValidationError;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::auth::require_admin;
use crate::error::ApiError;
use crate::server::ServerState;
use crate::server::system_now;

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

/// Body of `POST /api/measure`.
#[derive(Debug, Deserialize)]
pub(crate) struct MeasureRequest {
    /// Name to measure.
    pub(crate) name: Option<String>,
}

/// Body of `POST /api/leaderboard`.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingRequest {
    /// Previously measured name.
    pub(crate) name: Option<String>,
    /// `true` lists the entry, `false` removes it.
    #[serde(default = "default_upload")]
    pub(crate) upload: bool,
}

/// Body of `POST /api/admin/init` and `POST /api/admin/auth/login`.
#[derive(Debug, Deserialize)]
pub(crate) struct CredentialsRequest {
    /// Admin username.
    pub(crate) username: Option<String>,
    /// Admin password.
    pub(crate) password: Option<String>,
}

/// Body of `POST /api/admin/banned`.
#[derive(Debug, Deserialize)]
pub(crate) struct BanRequest {
    /// Banned string.
    pub(crate) value: Option<String>,
    /// Message shown to rejected callers.
    pub(crate) reason: Option<String>,
}

/// Body of `POST /api/admin/easter-eggs`.
#[derive(Debug, Deserialize)]
pub(crate) struct EasterEggRequest {
    /// Trigger string.
    pub(crate) trigger: Option<String>,
    /// Forced length.
    pub(crate) value: Option<i64>,
    /// Admin note.
    pub(crate) note: Option<String>,
}

/// Body of `PATCH /api/admin/measurements/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct MeasurementEditRequest {
    /// New length.
    pub(crate) value: Option<i64>,
    /// Optional new display name.
    pub(crate) name: Option<String>,
}

/// Query of `GET /api/admin/measurements`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    /// Case-insensitive substring.
    pub(crate) q: Option<String>,
}

/// Default for [`ListingRequest::upload`].
const fn default_upload() -> bool {
    true
}

// ============================================================================
// SECTION: Response Bodies
// ============================================================================

/// Response of `POST /api/measure`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeasureResponse {
    /// Stored measurement id.
    pub(crate) measurement_id: MeasurementId,
    /// Display name as last submitted.
    pub(crate) name: String,
    /// Assigned length.
    pub(crate) value: i32,
    /// Whether the entry is on the leaderboard.
    pub(crate) listed: bool,
    /// Flavor comment for the value.
    pub(crate) comment: &'static str,
    /// Position among listed entries.
    pub(crate) ranks: Ranks,
}

/// Response of `POST /api/leaderboard`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListingResponse {
    /// Stored measurement id.
    pub(crate) measurement_id: MeasurementId,
    /// Display name.
    pub(crate) name: String,
    /// Stored length.
    pub(crate) value: i32,
    /// Listing state after the request.
    pub(crate) listed: bool,
}

impl From<Measurement> for ListingResponse {
    fn from(measurement: Measurement) -> Self {
        Self {
            measurement_id: measurement.id,
            name: measurement.name,
            value: measurement.value,
            listed: measurement.listed,
        }
    }
}

/// Response of `POST /api/admin/init`.
#[derive(Debug, Serialize)]
pub(crate) struct BootstrapResponse {
    /// Human-readable confirmation.
    pub(crate) message: &'static str,
    /// Initial session token.
    pub(crate) token: String,
}

/// Response of `POST /api/admin/auth/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    /// New session token.
    pub(crate) token: String,
}

/// Response of admin deletes.
#[derive(Debug, Serialize)]
pub(crate) struct DeletedResponse {
    /// Always `true`.
    pub(crate) success: bool,
}

/// Confirmation returned by a successful bootstrap.
pub(crate) const BOOTSTRAP_MESSAGE: &str = "admin account created";

// ============================================================================
// SECTION: Public Cores
// ============================================================================

/// Measures a name.
pub(crate) fn measure(
    state: &ServerState,
    body: &[u8],
    now: Timestamp,
) -> Result<MeasureResponse, ApiError> {
    let request: MeasureRequest = parse_json(body)?;
    let name = required(request.name, "name")?;
    let outcome = state.engine.measure(&name, now)?;
    Ok(MeasureResponse {
        measurement_id: outcome.measurement.id,
        name: outcome.measurement.name,
        value: outcome.measurement.value,
        listed: outcome.measurement.listed,
        comment: outcome.comment,
        ranks: outcome.ranks,
    })
}

/// Returns the leaderboard.
pub(crate) fn leaderboard(state: &ServerState) -> Result<Leaderboard, ApiError> {
    state.leaderboard.snapshot().map_err(|err| ApiError::Internal(err.to_string()))
}

/// Lists or unlists a measured name.
pub(crate) fn set_listing(
    state: &ServerState,
    body: &[u8],
    now: Timestamp,
) -> Result<ListingResponse, ApiError> {
    let request: ListingRequest = parse_json(body)?;
    let name = required(request.name, "name")?;
    Ok(state.engine.set_listing(&name, request.upload, now)?.into())
}

// ============================================================================
// SECTION: Setup and Login Cores
// ============================================================================

/// Reports whether setup has completed.
pub(crate) fn status(state: &ServerState) -> Result<SetupStatus, ApiError> {
    Ok(state.admin.status()?)
}

/// Creates the first admin account.
///
/// A closed gate wins over a malformed body, so a repeat call is always a
/// conflict.
pub(crate) fn bootstrap(
    state: &ServerState,
    body: &[u8],
    now: Timestamp,
) -> Result<BootstrapResponse, ApiError> {
    let request = match parse_json::<CredentialsRequest>(body) {
        Ok(request) => request,
        Err(err) => {
            if state.admin.status()?.ready {
                return Err(AdminError::SetupClosed.into());
            }
            return Err(err);
        }
    };
    let outcome = state.admin.bootstrap(
        request.username.as_deref().unwrap_or_default(),
        request.password.as_deref().unwrap_or_default(),
        now,
    )?;
    tracing::info!(admin = %outcome.admin.username, "admin bootstrap completed; setup closed");
    Ok(BootstrapResponse {
        message: BOOTSTRAP_MESSAGE,
        token: outcome.token.as_str().to_string(),
    })
}

/// Exchanges credentials for a session token.
pub(crate) fn login(
    state: &ServerState,
    body: &[u8],
    now: Timestamp,
) -> Result<LoginResponse, ApiError> {
    let request: CredentialsRequest = parse_json(body)?;
    let username = required(request.username, "username")?;
    let password = required(request.password, "password")?;
    match state.admin.login(&username, &password, now) {
        Ok(token) => {
            tracing::info!(admin = %username.trim(), "admin login succeeded");
            Ok(LoginResponse {
                token: token.as_str().to_string(),
            })
        }
        Err(err) => {
            tracing::info!(admin = %username.trim(), "admin login rejected");
            Err(err.into())
        }
    }
}

// ============================================================================
// SECTION: Admin Cores
// ============================================================================

/// Lists bans.
pub(crate) fn list_bans(
    state: &ServerState,
    headers: &HeaderMap,
    now: Timestamp,
) -> Result<Vec<BannedName>, ApiError> {
    authorize(state, headers, now)?;
    Ok(state.admin.list_bans()?)
}

/// Creates or updates a ban.
pub(crate) fn upsert_ban(
    state: &ServerState,
    headers: &HeaderMap,
    body: &[u8],
    now: Timestamp,
) -> Result<BannedName, ApiError> {
    let admin = authorize(state, headers, now)?;
    let request: BanRequest = parse_json(body)?;
    let value = required(request.value, "value")?;
    let ban = state.admin.upsert_ban(&value, request.reason.as_deref(), now)?;
    tracing::info!(admin = %admin.username, ban_id = %ban.id, value = %ban.value, "ban saved");
    Ok(ban)
}

/// Deletes a ban.
pub(crate) fn delete_ban(
    state: &ServerState,
    headers: &HeaderMap,
    raw_id: &str,
    now: Timestamp,
) -> Result<DeletedResponse, ApiError> {
    let admin = authorize(state, headers, now)?;
    let id = parse_id(raw_id, "banned name not found")?;
    state.admin.delete_ban(BanId::new(id))?;
    tracing::info!(admin = %admin.username, ban_id = id, "ban deleted");
    Ok(DeletedResponse {
        success: true,
    })
}

/// Lists easter eggs.
pub(crate) fn list_easter_eggs(
    state: &ServerState,
    headers: &HeaderMap,
    now: Timestamp,
) -> Result<Vec<EasterEgg>, ApiError> {
    authorize(state, headers, now)?;
    Ok(state.admin.list_easter_eggs()?)
}

/// Creates or updates an easter egg.
pub(crate) fn upsert_easter_egg(
    state: &ServerState,
    headers: &HeaderMap,
    body: &[u8],
    now: Timestamp,
) -> Result<EasterEgg, ApiError> {
    let admin = authorize(state, headers, now)?;
    let request: EasterEggRequest = parse_json(body)?;
    let trigger = required(request.trigger, "trigger")?;
    let value = request.value.ok_or(ValidationError::Missing {
        field: "value",
    })?;
    let egg = state.admin.upsert_easter_egg(&trigger, value, request.note.as_deref(), now)?;
    tracing::info!(
        admin = %admin.username,
        egg_id = %egg.id,
        trigger = %egg.trigger,
        value = egg.value,
        "easter egg saved"
    );
    Ok(egg)
}

/// Deletes an easter egg.
pub(crate) fn delete_easter_egg(
    state: &ServerState,
    headers: &HeaderMap,
    raw_id: &str,
    now: Timestamp,
) -> Result<DeletedResponse, ApiError> {
    let admin = authorize(state, headers, now)?;
    let id = parse_id(raw_id, "easter egg not found")?;
    state.admin.delete_easter_egg(EasterEggId::new(id))?;
    tracing::info!(admin = %admin.username, egg_id = id, "easter egg deleted");
    Ok(DeletedResponse {
        success: true,
    })
}

/// Searches measurements.
pub(crate) fn search_measurements(
    state: &ServerState,
    headers: &HeaderMap,
    query: &SearchQuery,
    now: Timestamp,
) -> Result<Vec<Measurement>, ApiError> {
    authorize(state, headers, now)?;
    Ok(state.admin.search_measurements(query.q.as_deref())?)
}

/// Edits a measurement.
pub(crate) fn edit_measurement(
    state: &ServerState,
    headers: &HeaderMap,
    raw_id: &str,
    body: &[u8],
    now: Timestamp,
) -> Result<Measurement, ApiError> {
    let admin = authorize(state, headers, now)?;
    let id = parse_id(raw_id, "measurement not found")?;
    let request: MeasurementEditRequest = parse_json(body)?;
    let value = request.value.ok_or(ValidationError::Missing {
        field: "value",
    })?;
    let updated = state.admin.edit_measurement(
        MeasurementId::new(id),
        value,
        request.name.as_deref(),
        now,
    )?;
    tracing::info!(
        admin = %admin.username,
        measurement_id = id,
        value = updated.value,
        "measurement edited"
    );
    Ok(updated)
}

// ============================================================================
// SECTION: Async Handlers
// ============================================================================

/// `POST /api/measure`.
pub(crate) async fn post_measure(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<MeasureResponse>, ApiError> {
    blocking(state, move |state| measure(state, &body, system_now())).await.map(Json)
}

/// `GET /api/leaderboard`.
pub(crate) async fn get_leaderboard(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Leaderboard>, ApiError> {
    blocking(state, leaderboard).await.map(Json)
}

/// `POST /api/leaderboard`.
pub(crate) async fn post_leaderboard(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<ListingResponse>, ApiError> {
    blocking(state, move |state| set_listing(state, &body, system_now())).await.map(Json)
}

/// `GET /api/admin/status`.
pub(crate) async fn get_status(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<SetupStatus>, ApiError> {
    blocking(state, status).await.map(Json)
}

/// `POST /api/admin/init`.
pub(crate) async fn post_init(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<BootstrapResponse>, ApiError> {
    blocking(state, move |state| bootstrap(state, &body, system_now())).await.map(Json)
}

/// `POST /api/admin/auth/login`.
pub(crate) async fn post_login(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, ApiError> {
    blocking(state, move |state| login(state, &body, system_now())).await.map(Json)
}

/// `GET /api/admin/banned`.
pub(crate) async fn get_bans(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BannedName>>, ApiError> {
    blocking(state, move |state| list_bans(state, &headers, system_now())).await.map(Json)
}

/// `POST /api/admin/banned`.
pub(crate) async fn post_ban(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<BannedName>), ApiError> {
    blocking(state, move |state| upsert_ban(state, &headers, &body, system_now()))
        .await
        .map(|ban| (StatusCode::CREATED, Json(ban)))
}

/// `DELETE /api/admin/banned/{id}`.
pub(crate) async fn delete_ban_by_id(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeletedResponse>, ApiError> {
    blocking(state, move |state| delete_ban(state, &headers, &id, system_now())).await.map(Json)
}

/// `GET /api/admin/easter-eggs`.
pub(crate) async fn get_easter_eggs(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<EasterEgg>>, ApiError> {
    blocking(state, move |state| list_easter_eggs(state, &headers, system_now()))
        .await
        .map(Json)
}

/// `POST /api/admin/easter-eggs`.
pub(crate) async fn post_easter_egg(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<EasterEgg>), ApiError> {
    blocking(state, move |state| upsert_easter_egg(state, &headers, &body, system_now()))
        .await
        .map(|egg| (StatusCode::CREATED, Json(egg)))
}

/// `DELETE /api/admin/easter-eggs/{id}`.
pub(crate) async fn delete_easter_egg_by_id(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeletedResponse>, ApiError> {
    blocking(state, move |state| delete_easter_egg(state, &headers, &id, system_now()))
        .await
        .map(Json)
}

/// `GET /api/admin/measurements`.
pub(crate) async fn get_measurements(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Measurement>>, ApiError> {
    blocking(state, move |state| search_measurements(state, &headers, &query, system_now()))
        .await
        .map(Json)
}

/// `PATCH /api/admin/measurements/{id}`.
pub(crate) async fn patch_measurement(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Measurement>, ApiError> {
    blocking(state, move |state| edit_measurement(state, &headers, &id, &body, system_now()))
        .await
        .map(Json)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Runs a handler core on the blocking pool.
async fn blocking<T, F>(state: Arc<ServerState>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ServerState) -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&state))
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
}

/// Authenticates an admin request.
fn authorize(
    state: &ServerState,
    headers: &HeaderMap,
    now: Timestamp,
) -> Result<AdminAccount, ApiError> {
    require_admin(&state.sessions, headers, now)
}

/// Parses a JSON request body.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|_| ApiError::Validation("request body must be a valid json object".to_string()))
}

/// Unwraps a required string field.
fn required(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    value.ok_or_else(|| {
        ValidationError::Missing {
            field,
        }
        .into()
    })
}

/// Parses a path id; ids that cannot exist are reported as missing records.
fn parse_id(raw: &str, not_found: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::NotFound(not_found.to_string()))
}
