//! Registry of live WebSocket connections.
//!
//! The registry is the supervising view over all per-connection push
//! tickers. A background sweeper force-cancels connections whose session
//! loop died without cleaning up, so no orphaned ticker outlives its
//! client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pulse_core::ConnectionId;

use crate::metrics::SWEEPER_CANCELLED_TOTAL;

use super::connection::ClientConnection;

/// Tracks connected clients and supervises their lifecycle.
pub struct ConnectionRegistry {
    /// Connected clients indexed by connection ID.
    connections: RwLock<HashMap<ConnectionId, Arc<ClientConnection>>>,
}

impl ConnectionRegistry {
    /// Create a new registry.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection.
    pub async fn add(&self, connection: Arc<ClientConnection>) {
        let mut conns = self.connections.write().await;
        let _ = conns.insert(connection.id.clone(), connection);
    }

    /// Remove a connection by ID.
    pub async fn remove(&self, connection_id: &ConnectionId) {
        let mut conns = self.connections.write().await;
        let _ = conns.remove(connection_id);
    }

    /// Number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Cancel every registered connection.
    pub async fn cancel_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            conn.cancel();
        }
    }

    /// Force-cancel and remove connections that are dead.
    ///
    /// A connection is dead when its outbound channel is closed or when
    /// no inbound activity was seen within `timeout`. Returns the number
    /// of connections swept.
    pub async fn sweep_stale(&self, timeout: Duration) -> usize {
        let mut conns = self.connections.write().await;
        let before = conns.len();

        conns.retain(|id, conn| {
            let stale = conn.is_closed() || conn.last_seen_elapsed() > timeout;
            if stale {
                warn!(connection_id = %id, "sweeping dead connection");
                conn.cancel();
            }
            !stale
        });

        let swept = before - conns.len();
        if swept > 0 {
            metrics::counter!(SWEEPER_CANCELLED_TOTAL).increment(swept as u64);
        }
        swept
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodically sweep the registry for dead connections.
///
/// Runs until `cancel` fires.
pub async fn run_sweeper(
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) {
    let mut sweep_interval = time::interval(interval);
    // First tick fires immediately; skip it so a fresh server does not
    // sweep before any connection has had a chance to speak.
    let _ = sweep_interval.tick().await;

    info!(
        interval_secs = interval.as_secs(),
        timeout_secs = timeout.as_secs(),
        "connection sweeper started"
    );

    loop {
        tokio::select! {
            _ = sweep_interval.tick() => {
                let swept = registry.sweep_stale(timeout).await;
                if swept > 0 {
                    debug!(swept, "sweeper cancelled dead connections");
                }
            }
            () = cancel.cancelled() => {
                info!("connection sweeper stopped");
                return;
            }
        }
    }
}
