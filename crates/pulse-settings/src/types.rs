//! Settings structures with compiled defaults.
//!
//! Every struct uses `#[serde(default)]` so a partial settings file only
//! overrides the keys it names. Field names are camelCase on disk.

use serde::{Deserialize, Serialize};

/// Root settings document (`~/.pulse/settings.json`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PulseSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name, used in log output.
    pub name: String,
    /// HTTP server settings.
    pub server: ServerSettings,
    /// SQLite database settings.
    pub database: DatabaseSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
    /// Push channel settings.
    pub push: PushSettings,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "pulse".to_string(),
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            logging: LoggingSettings::default(),
            push: PushSettings::default(),
        }
    }
}

/// Server network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// HTTP and WebSocket port.
    pub port: u16,
    /// Maximum number of concurrent push connections.
    pub max_connections: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3040,
            max_connections: 50,
        }
    }
}

/// SQLite database settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file path. `None` resolves to `~/.pulse/database/pulse.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Connection pool size.
    pub pool_size: u32,
    /// SQLite busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            pool_size: 16,
            busy_timeout_ms: 30_000,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default log filter (overridable via `RUST_LOG`).
    pub level: String,
    /// Emit JSON log lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Push channel settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PushSettings {
    /// Interval between number frames on each connection, in milliseconds.
    pub tick_interval_ms: u64,
    /// Interval between protocol pings, in milliseconds.
    pub ping_interval_ms: u64,
    /// A connection silent for longer than this is considered dead.
    pub liveness_timeout_ms: u64,
    /// Interval between registry sweeps for dead connections.
    pub sweep_interval_ms: u64,
    /// Outbound frame queue capacity per connection.
    pub outbound_queue: usize,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            ping_interval_ms: 30_000,
            liveness_timeout_ms: 90_000,
            sweep_interval_ms: 30_000,
            outbound_queue: 64,
        }
    }
}
