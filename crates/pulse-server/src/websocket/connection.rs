//! WebSocket client connection state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use pulse_core::ConnectionId;

/// Represents a connected WebSocket client.
pub struct ClientConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Send channel to the client's WebSocket write task.
    tx: mpsc::Sender<String>,
    /// When this connection was established.
    pub connected_at: Instant,
    /// Whether the client has responded to the last ping.
    pub is_alive: AtomicBool,
    /// When the last Pong (or any inbound activity) was received.
    last_seen: Mutex<Instant>,
    /// Count of frames dropped due to full channel.
    pub dropped_frames: AtomicU64,
    /// Cancels this connection's push ticker and session loop.
    ///
    /// Child of the server shutdown token, so shutdown cancels it too.
    cancel: CancellationToken,
}

impl ClientConnection {
    /// Create a new connection.
    pub fn new(id: ConnectionId, tx: mpsc::Sender<String>, cancel: CancellationToken) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_seen: Mutex::new(now),
            dropped_frames: AtomicU64::new(0),
            cancel,
        }
    }

    /// Send a text frame to the client.
    ///
    /// Returns `false` if the channel is full or closed, and increments
    /// the dropped frame counter.
    pub fn send(&self, frame: String) -> bool {
        if self.tx.try_send(frame).is_ok() {
            true
        } else {
            let _ = self.dropped_frames.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Whether the outbound channel has been closed (receiver dropped).
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Total frames dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Mark the connection as alive (pong or message received).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_seen.lock() = Instant::now();
    }

    /// Duration since the last inbound activity (or connection establishment).
    pub fn last_seen_elapsed(&self) -> Duration {
        self.last_seen.lock().elapsed()
    }

    /// Check and reset the alive flag for the ping cycle.
    ///
    /// Returns `true` if the connection was alive since the last check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Cancel this connection's tasks.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether this connection has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
