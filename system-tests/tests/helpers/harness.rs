// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Ruler Server Harness
// Description: Helpers for spawning Cosmic Ruler servers in system-tests.
// Purpose: Provide deterministic server startup and teardown for tests.
// Dependencies: cosmic-ruler-config, cosmic-ruler-server, tempfile, tokio
// ============================================================================

use std::net::SocketAddr;
use std::net::TcpListener;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use cosmic_ruler_config::RulerConfig;
use cosmic_ruler_server::RulerServer;
use cosmic_ruler_server::ServerError;
use system_tests::config::SystemTestConfig;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use super::client::RulerClient;
use super::readiness::wait_for_server_ready;

/// Handle for a spawned server and the directory holding its database.
pub struct RulerServerHandle {
    /// Base URL such as `http://127.0.0.1:PORT`.
    base_url: String,
    /// Database file inside the temporary directory.
    db_path: PathBuf,
    /// Per-request and readiness timeout.
    timeout: Duration,
    /// Server task.
    join: JoinHandle<Result<(), ServerError>>,
    /// Keeps the database directory alive until the handle drops.
    _data_dir: TempDir,
}

impl RulerServerHandle {
    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the `SQLite` database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Builds an HTTP client for the server.
    pub fn client(&self) -> Result<RulerClient, String> {
        RulerClient::new(self.base_url.clone(), self.timeout)
    }

    /// Shuts down the server task.
    pub async fn shutdown(self) {
        self.join.abort();
        let _ = self.join.await;
    }
}

/// Returns a free loopback address for test servers.
pub fn allocate_bind_addr() -> Result<SocketAddr, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("failed to bind loopback: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("failed to read listener address: {err}"))?;
    drop(listener);
    Ok(addr)
}

/// Builds a server config bound to `bind` with a database at `db_path`.
pub fn base_config_toml(bind: SocketAddr, db_path: &Path, extra: &str) -> String {
    format!(
        "[server]\nbind = \"{bind}\"\n\n[store]\npath = '{}'\n\n{extra}\n",
        db_path.display()
    )
}

/// Spawns a server with default settings and waits until it answers.
pub async fn spawn_ruler_server() -> Result<RulerServerHandle, String> {
    spawn_ruler_server_with("").await
}

/// Spawns a server with extra TOML tables appended to the base config.
pub async fn spawn_ruler_server_with(extra_toml: &str) -> Result<RulerServerHandle, String> {
    let settings = SystemTestConfig::load()?;
    let bind = match settings.http_bind {
        Some(bind) => bind,
        None => allocate_bind_addr()?,
    };
    let data_dir = TempDir::new().map_err(|err| format!("temp dir: {err}"))?;
    let db_path = data_dir.path().join("cosmic-ruler.db");
    let config = RulerConfig::from_toml_str(&base_config_toml(bind, &db_path, extra_toml))
        .map_err(|err| format!("config: {err}"))?;
    let server = tokio::task::spawn_blocking(move || RulerServer::from_config(&config))
        .await
        .map_err(|err| format!("ruler server init join failed: {err}"))?
        .map_err(|err| err.to_string())?;
    let join = tokio::spawn(server.serve());
    let handle = RulerServerHandle {
        base_url: format!("http://{bind}"),
        db_path,
        timeout: settings.timeout_or_default(),
        join,
        _data_dir: data_dir,
    };
    let client = handle.client()?;
    wait_for_server_ready(&client, handle.timeout).await?;
    Ok(handle)
}
