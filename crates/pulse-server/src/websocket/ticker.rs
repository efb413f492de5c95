//! Per-connection number push ticker.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::metrics::{PUSH_DROPPED_FRAMES_TOTAL, PUSH_TICKS_TOTAL};

use super::connection::ClientConnection;

/// Outcome of the ticker loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerResult {
    /// The outbound channel was closed (client write task gone).
    ChannelClosed,
    /// The ticker was cancelled externally.
    Cancelled,
}

/// Build a single push frame carrying a random digit.
pub fn number_frame() -> String {
    let n: u8 = rand::rng().random_range(0..10);
    serde_json::json!({ "event": "number", "data": n }).to_string()
}

/// Push a random number frame to the client once per `period`.
///
/// Frames dropped on a full channel are counted and the loop continues.
/// Only a closed channel ends the loop: the client's write task has
/// exited and no future frame can be delivered.
pub async fn run_ticker(
    connection: Arc<ClientConnection>,
    period: Duration,
    cancel: CancellationToken,
) -> TickerResult {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let frame = number_frame();
                metrics::counter!(PUSH_TICKS_TOTAL).increment(1);

                if !connection.send(frame) {
                    if connection.is_closed() {
                        return TickerResult::ChannelClosed;
                    }
                    metrics::counter!(PUSH_DROPPED_FRAMES_TOTAL).increment(1);
                    debug!(
                        connection_id = %connection.id,
                        dropped = connection.drop_count(),
                        "outbound queue full, frame dropped"
                    );
                }
            }
            () = cancel.cancelled() => {
                return TickerResult::Cancelled;
            }
        }
    }
}
