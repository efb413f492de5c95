//! Server configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the Pulse server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `3040`, `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent WebSocket connections.
    pub max_connections: usize,
    /// Interval between number frames per connection, in milliseconds.
    pub tick_interval_ms: u64,
    /// Interval between server-initiated Ping frames, in seconds.
    pub ping_interval_secs: u64,
    /// A connection silent for longer than this is considered dead, in seconds.
    pub liveness_timeout_secs: u64,
    /// Interval between registry sweeps for dead connections, in seconds.
    pub sweep_interval_secs: u64,
    /// Outbound frame queue capacity per connection.
    pub outbound_queue: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3040,
            max_connections: 50,
            tick_interval_ms: 1000,
            ping_interval_secs: 30,
            liveness_timeout_secs: 90,
            sweep_interval_secs: 30,
            outbound_queue: 64,
        }
    }
}
