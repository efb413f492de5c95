//! # pulse-backend
//!
//! Pulse server binary — wires settings, database, and the HTTP/WebSocket
//! server together.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pulse_server::config::ServerConfig;
use pulse_server::server::PulseServer;
use pulse_settings::PulseSettings;
use pulse_store::{ConnectionConfig, ContactStore};

/// Pulse server.
#[derive(Parser, Debug)]
#[command(name = "pulse-backend", about = "Pulse number-push and contact server")]
struct Cli {
    /// Host to bind (overrides settings if specified).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings if specified).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Milliseconds between pushed number frames (overrides settings).
    #[arg(long)]
    tick_interval_ms: Option<u64>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn default_db_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home)
        .join(".pulse")
        .join("database")
        .join("pulse.db")
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

fn init_logging(settings: &PulseSettings, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json || settings.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Map settings (millisecond intervals) and CLI overrides onto the
/// server configuration.
fn server_config(settings: &PulseSettings, args: &Cli) -> ServerConfig {
    ServerConfig {
        host: args.host.clone().unwrap_or_else(|| settings.server.host.clone()),
        port: args.port.unwrap_or(settings.server.port),
        max_connections: settings.server.max_connections,
        tick_interval_ms: args
            .tick_interval_ms
            .unwrap_or(settings.push.tick_interval_ms),
        ping_interval_secs: (settings.push.ping_interval_ms / 1000).max(1),
        liveness_timeout_secs: (settings.push.liveness_timeout_ms / 1000).max(1),
        sweep_interval_secs: (settings.push.sweep_interval_ms / 1000).max(1),
        outbound_queue: settings.push.outbound_queue.max(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings = pulse_settings::load_settings().unwrap_or_else(|e| {
        eprintln!("failed to load settings, using defaults: {e}");
        PulseSettings::default()
    });

    init_logging(&settings, args.json_logs);

    // Database — CLI flag beats settings/env, which beat the default path.
    let db_path = args
        .db_path
        .clone()
        .or_else(|| settings.database.path.clone().map(PathBuf::from))
        .unwrap_or_else(default_db_path);
    ensure_parent_dir(&db_path)?;

    let db_config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: u32::try_from(settings.database.busy_timeout_ms).unwrap_or(30_000),
        ..ConnectionConfig::default()
    };
    let db_str = db_path.to_string_lossy();
    let pool = pulse_store::new_file(&db_str, &db_config).context("Failed to open database")?;
    {
        let conn = pool.get().context("Failed to get DB connection")?;
        let _ = pulse_store::run_migrations(&conn).context("Failed to run migrations")?;
    }
    let contacts = ContactStore::new(pool);

    let metrics_handle = pulse_server::metrics::install_recorder();

    let config = server_config(&settings, &args);
    let server = PulseServer::new(config, contacts, metrics_handle);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!(db = %db_path.display(), "Pulse listening on http://{addr}");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("Shutting down...");
    server.shutdown().graceful_shutdown(vec![handle], None).await;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_defaults_to_settings_driven_values() {
        let cli = Cli::parse_from(["pulse-backend"]);
        assert_eq!(cli.host, None);
        assert_eq!(cli.port, None);
        assert_eq!(cli.db_path, None);
        assert_eq!(cli.tick_interval_ms, None);
        assert!(!cli.json_logs);
    }

    #[test]
    fn cli_custom_host_and_port() {
        let cli = Cli::parse_from(["pulse-backend", "--host", "0.0.0.0", "--port", "8080"]);
        assert_eq!(cli.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn cli_db_path() {
        let cli = Cli::parse_from(["pulse-backend", "--db-path", "/tmp/test.db"]);
        assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/test.db")));
    }

    #[test]
    fn cli_tick_interval() {
        let cli = Cli::parse_from(["pulse-backend", "--tick-interval-ms", "250"]);
        assert_eq!(cli.tick_interval_ms, Some(250));
    }

    #[test]
    fn cli_json_logs_flag() {
        let cli = Cli::parse_from(["pulse-backend", "--json-logs"]);
        assert!(cli.json_logs);
    }

    #[test]
    fn default_db_path_under_pulse_dir() {
        let path = default_db_path();
        assert!(path.to_string_lossy().contains(".pulse"));
        assert!(path.to_string_lossy().ends_with("pulse.db"));
    }

    #[test]
    fn ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("test.db");
        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn server_config_from_default_settings() {
        let settings = PulseSettings::default();
        let cli = Cli::parse_from(["pulse-backend"]);
        let config = server_config(&settings, &cli);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3040);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.ping_interval_secs, 30);
        assert_eq!(config.liveness_timeout_secs, 90);
        assert_eq!(config.sweep_interval_secs, 30);
    }

    #[test]
    fn cli_overrides_beat_settings() {
        let settings = PulseSettings::default();
        let cli = Cli::parse_from([
            "pulse-backend",
            "--host",
            "0.0.0.0",
            "--port",
            "0",
            "--tick-interval-ms",
            "100",
        ]);
        let config = server_config(&settings, &cli);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 0);
        assert_eq!(config.tick_interval_ms, 100);
    }

    #[test]
    fn sub_second_intervals_clamp_to_one_second() {
        let mut settings = PulseSettings::default();
        settings.push.ping_interval_ms = 10;
        settings.push.liveness_timeout_ms = 10;
        settings.push.sweep_interval_ms = 10;
        let cli = Cli::parse_from(["pulse-backend"]);
        let config = server_config(&settings, &cli);
        assert_eq!(config.ping_interval_secs, 1);
        assert_eq!(config.liveness_timeout_secs, 1);
        assert_eq!(config.sweep_interval_secs, 1);
    }

    #[test]
    fn server_creates_db_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("new.db");
        assert!(!db_path.exists());

        let db_str = db_path.to_string_lossy();
        let pool = pulse_store::new_file(&db_str, &ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let _ = pulse_store::run_migrations(&conn).unwrap();

        assert!(db_path.exists());
    }

    #[test]
    fn server_runs_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db_str = db_path.to_string_lossy();
        let pool = pulse_store::new_file(&db_str, &ConnectionConfig::default()).unwrap();
        let conn = pool.get().unwrap();
        let _ = pulse_store::run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='contacts'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn server_boots_and_responds() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("pulse.db");
        let db_str = db_path.to_string_lossy();
        let pool = pulse_store::new_file(&db_str, &ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = pulse_store::run_migrations(&conn).unwrap();
        }
        let contacts = ContactStore::new(pool);

        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let server = PulseServer::new(config, contacts, metrics_handle);
        let (addr, handle) = server.listen().await.unwrap();

        let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert!(resp.status().is_success());
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");

        server.shutdown().shutdown();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn server_graceful_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("pulse.db");
        let db_str = db_path.to_string_lossy();
        let pool = pulse_store::new_file(&db_str, &ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = pulse_store::run_migrations(&conn).unwrap();
        }
        let contacts = ContactStore::new(pool);

        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
            .build_recorder()
            .handle();
        let server = PulseServer::new(config, contacts, metrics_handle);
        let (_, handle) = server.listen().await.unwrap();

        server.shutdown().shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("shutdown timed out")
            .expect("join error");
    }
}
