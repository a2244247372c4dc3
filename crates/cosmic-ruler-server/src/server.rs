// crates/cosmic-ruler-server/src/server.rs
// ============================================================================
// Module: Ruler Server
// Description: HTTP server wiring for the Cosmic Ruler API.
// Purpose: Build runtime services from config and serve them over axum.
// Dependencies: cosmic-ruler-{config,core,store-sqlite}, axum, tokio, tracing
// ============================================================================

//! ## Overview
//! [`RulerServer::from_config`] opens the `SQLite` store and builds the
//! runtime services once; every request then shares them. The wall clock
//! is read here and nowhere else.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::patch;
use axum::routing::post;
use cosmic_ruler_config::RulerConfig;
use cosmic_ruler_core::AdminConsole;
use cosmic_ruler_core::CredentialHasher;
use cosmic_ruler_core::LeaderboardView;
use cosmic_ruler_core::LengthSource;
use cosmic_ruler_core::MeasurementEngine;
use cosmic_ruler_core::SessionAuthenticator;
use cosmic_ruler_core::SessionPolicy;
use cosmic_ruler_core::SharedStore;
use cosmic_ruler_core::Timestamp;
use cosmic_ruler_core::TokenSource;
use cosmic_ruler_store_sqlite::SqliteRulerStore;
use thiserror::Error;

use crate::auth::Argon2Credentials;
use crate::entropy::OsEntropy;
use crate::routes;

// ============================================================================
// SECTION: State
// ============================================================================

/// Runtime services shared by every request.
#[derive(Clone)]
pub(crate) struct ServerState {
    /// Measurement and listing engine.
    pub(crate) engine: MeasurementEngine,
    /// Leaderboard projection.
    pub(crate) leaderboard: LeaderboardView,
    /// Session issue and validation.
    pub(crate) sessions: SessionAuthenticator,
    /// Setup gate and curation.
    pub(crate) admin: AdminConsole,
}

impl ServerState {
    /// Builds state with OS entropy and argon2 hashing.
    pub(crate) fn new(store: SharedStore, policy: SessionPolicy, leaderboard_limit: usize) -> Self {
        Self::with_sources(
            store,
            Arc::new(OsEntropy),
            Arc::new(OsEntropy),
            Arc::new(Argon2Credentials),
            policy,
            leaderboard_limit,
        )
    }

    /// Builds state from explicit entropy and hashing sources.
    pub(crate) fn with_sources(
        store: SharedStore,
        lengths: Arc<dyn LengthSource>,
        tokens: Arc<dyn TokenSource>,
        hasher: Arc<dyn CredentialHasher>,
        policy: SessionPolicy,
        leaderboard_limit: usize,
    ) -> Self {
        let sessions = SessionAuthenticator::new(Arc::clone(&store), tokens, policy);
        Self {
            engine: MeasurementEngine::new(Arc::clone(&store), lengths),
            leaderboard: LeaderboardView::new(Arc::clone(&store), leaderboard_limit),
            admin: AdminConsole::new(store, sessions.clone(), hasher),
            sessions,
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Cosmic Ruler HTTP server.
pub struct RulerServer {
    /// Address to bind.
    bind: SocketAddr,
    /// Request body limit.
    max_body_bytes: usize,
    /// Shared runtime services.
    state: Arc<ServerState>,
}

impl RulerServer {
    /// Builds a server from validated configuration, opening the store.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when the config is invalid or the store
    /// cannot be opened.
    pub fn from_config(config: &RulerConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let bind = config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let store = SqliteRulerStore::new(&config.store.sqlite_config())
            .map_err(|err| ServerError::Init(err.to_string()))?;
        tracing::info!(path = %config.store.path.display(), "store opened");
        let state =
            ServerState::new(Arc::new(store), config.sessions.policy(), config.leaderboard.limit);
        Ok(Self {
            bind,
            max_body_bytes: config.server.max_body_bytes,
            state: Arc::new(state),
        })
    }

    /// Returns the configured bind address.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind
    }

    /// Builds the API router.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.state), self.max_body_bytes)
    }

    /// Serves until the process is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when binding or serving fails.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .map_err(|err| ServerError::Transport(format!("bind {} failed: {err}", self.bind)))?;
        let local = listener.local_addr().map_err(|err| ServerError::Transport(err.to_string()))?;
        tracing::info!(addr = %local, "cosmic ruler listening");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| ServerError::Transport(format!("http server failed: {err}")))
    }
}

/// Builds the API router over shared state.
pub(crate) fn build_router(state: Arc<ServerState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/measure", post(routes::post_measure))
        .route("/api/leaderboard", get(routes::get_leaderboard).post(routes::post_leaderboard))
        .route("/api/admin/status", get(routes::get_status))
        .route("/api/admin/init", post(routes::post_init))
        .route("/api/admin/auth/login", post(routes::post_login))
        .route("/api/admin/banned", get(routes::get_bans).post(routes::post_ban))
        .route("/api/admin/banned/{id}", delete(routes::delete_ban_by_id))
        .route(
            "/api/admin/easter-eggs",
            get(routes::get_easter_eggs).post(routes::post_easter_egg),
        )
        .route("/api/admin/easter-eggs/{id}", delete(routes::delete_easter_egg_by_id))
        .route("/api/admin/measurements", get(routes::get_measurements))
        .route("/api/admin/measurements/{id}", patch(routes::patch_measurement))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Reads the wall clock as a [`Timestamp`].
#[must_use]
pub fn system_now() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
    Timestamp::from_unix_millis(millis)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and transport errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
