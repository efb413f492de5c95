//! WebSocket session lifecycle — handles a single connected client from
//! upgrade through disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use pulse_core::ConnectionId;

use crate::config::ServerConfig;
use crate::metrics::{
    WS_CONNECTION_DURATION_SECONDS, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL,
    WS_DISCONNECTIONS_TOTAL,
};

use super::connection::ClientConnection;
use super::registry::ConnectionRegistry;
use super::ticker::run_ticker;

/// Run a WebSocket session for a connected client.
///
/// 1. Registers the connection and spawns its push ticker
/// 2. Forwards pushed frames via the send channel
/// 3. Sends periodic Ping frames and disconnects unresponsive clients
/// 4. Cleans up on disconnect: ticker cancelled before the registry entry
///    is removed, so no orphaned timer outlives the client
#[instrument(skip_all, fields(connection_id = %connection_id))]
pub async fn run_ws_session(
    ws: WebSocket,
    connection_id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
    config: ServerConfig,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    // Create the client connection and send channel. The cancel token is
    // a child of the server shutdown token.
    let (send_tx, mut send_rx) = mpsc::channel::<String>(config.outbound_queue);
    let cancel = shutdown.child_token();
    let connection = Arc::new(ClientConnection::new(
        connection_id.clone(),
        send_tx,
        cancel.clone(),
    ));

    let connection_start = std::time::Instant::now();
    info!("client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    registry.add(connection.clone()).await;

    let ping_interval = Duration::from_secs(config.ping_interval_secs);
    let liveness_timeout = Duration::from_secs(config.liveness_timeout_secs);

    // Spawn outbound forwarder with periodic Ping frames.
    let outbound_conn = connection.clone();
    let outbound = tokio::spawn(async move {
        let mut ping_ticks = tokio::time::interval(ping_interval);
        // Skip the immediate first tick
        let _ = ping_ticks.tick().await;

        loop {
            tokio::select! {
                frame = send_rx.recv() => {
                    match frame {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ping_ticks.tick() => {
                    // Check if the client responded to the previous ping
                    if !outbound_conn.check_alive()
                        && outbound_conn.last_seen_elapsed() > liveness_timeout
                    {
                        warn!(
                            "client unresponsive for {:?}, disconnecting",
                            liveness_timeout
                        );
                        break;
                    }
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Spawn the per-connection number push ticker.
    let ticker = tokio::spawn(run_ticker(
        connection.clone(),
        Duration::from_millis(config.tick_interval_ms),
        cancel.clone(),
    ));

    // Process incoming messages until the client goes away or the
    // connection is cancelled (shutdown or sweeper).
    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(_) | Message::Binary(_) => {
                        // The push channel is one-way; inbound frames only
                        // count as liveness.
                        connection.mark_alive();
                    }
                    Message::Close(_) => {
                        info!("client sent close frame");
                        break;
                    }
                    Message::Ping(_) | Message::Pong(_) => {
                        connection.mark_alive();
                    }
                }
            }
            () = cancel.cancelled() => {
                info!("connection cancelled");
                break;
            }
        }
    }

    // Clean up. Ticker cancellation comes first: the disconnect must stop
    // the push timer.
    cancel.cancel();
    outbound.abort();
    let _ = ticker.await;
    registry.remove(&connection_id).await;

    info!(
        dropped_frames = connection.drop_count(),
        "client disconnected"
    );
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    histogram!(WS_CONNECTION_DURATION_SECONDS).record(connection_start.elapsed().as_secs_f64());
}
