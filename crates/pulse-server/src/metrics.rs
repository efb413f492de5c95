//! Prometheus metrics recorder and `/metrics` endpoint handler.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

// Metric name constants to avoid typos across modules.

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active WebSocket connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// WebSocket connection duration seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Number frames pushed total (counter).
pub const PUSH_TICKS_TOTAL: &str = "push_ticks_total";
/// Number frames dropped due to full outbound queue (counter).
pub const PUSH_DROPPED_FRAMES_TOTAL: &str = "push_dropped_frames_total";
/// Connections force-cancelled by the registry sweeper (counter).
pub const SWEEPER_CANCELLED_TOTAL: &str = "sweeper_cancelled_total";
/// Addition requests served total (counter).
pub const ADD_REQUESTS_TOTAL: &str = "add_requests_total";
/// Contact submissions persisted total (counter).
pub const CONTACT_SUBMISSIONS_TOTAL: &str = "contact_submissions_total";
