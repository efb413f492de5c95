//! HTTP/WebSocket server assembly.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use pulse_core::ConnectionId;
use pulse_store::ContactStore;

use crate::config::ServerConfig;
use crate::health::health_check;
use crate::routes::{add_two_numbers, submit_contact};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::registry::{ConnectionRegistry, run_sweeper};
use crate::websocket::session::run_ws_session;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Live WebSocket connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Contact persistence.
    pub contacts: Arc<ContactStore>,
    /// Server-wide shutdown coordination.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started, for uptime reporting.
    pub start_time: Instant,
    /// Server configuration.
    pub config: ServerConfig,
    /// Renders the Prometheus exposition text.
    pub metrics: PrometheusHandle,
}

/// The Pulse HTTP/WebSocket server.
pub struct PulseServer {
    state: AppState,
}

impl PulseServer {
    /// Create a new server.
    pub fn new(config: ServerConfig, contacts: ContactStore, metrics: PrometheusHandle) -> Self {
        Self {
            state: AppState {
                registry: Arc::new(ConnectionRegistry::new()),
                contacts: Arc::new(contacts),
                shutdown: Arc::new(ShutdownCoordinator::new()),
                start_time: Instant::now(),
                config,
                metrics,
            },
        }
    }

    /// The connection registry.
    pub fn registry(&self) -> Arc<ConnectionRegistry> {
        self.state.registry.clone()
    }

    /// The shutdown coordinator.
    pub fn shutdown(&self) -> Arc<ShutdownCoordinator> {
        self.state.shutdown.clone()
    }

    /// The server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the axum router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/addTwoNumber", get(add_two_numbers))
            .route("/contact", post(submit_contact))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/ws", get(ws_handler))
            .fallback(crate::assets::serve_static)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind and serve.
    ///
    /// Returns the bound address and the join handle of the serve task.
    /// The sweeper runs as a detached task cancelled by shutdown.
    pub async fn listen(&self) -> io::Result<(SocketAddr, JoinHandle<()>)> {
        let config = &self.state.config;
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "server listening");

        let token = self.state.shutdown.token();
        let _sweeper = tokio::spawn(run_sweeper(
            self.state.registry.clone(),
            Duration::from_secs(config.sweep_interval_secs),
            Duration::from_secs(config.liveness_timeout_secs),
            token.clone(),
        ));

        let app = self.router();
        let registry = self.state.registry.clone();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                token.cancelled().await;
                // Force-cancel every registered session before the drain;
                // idle upgrades would otherwise hold the serve task open.
                registry.cancel_all().await;
            });
            if let Err(e) = serve.await {
                warn!(error = %e, "server exited with error");
            }
        });

        Ok((addr, handle))
    }
}

/// `GET /health`
async fn health_handler(State(state): State<AppState>) -> Response {
    let connections = state.registry.connection_count().await;
    Json(health_check(state.start_time, connections)).into_response()
}

/// `GET /metrics`
async fn metrics_handler(State(state): State<AppState>) -> Response {
    crate::metrics::render(&state.metrics).into_response()
}

/// `GET /ws` — upgrade to a WebSocket push session.
///
/// Refused with 503 once the connection cap is reached.
async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let active = state.registry.connection_count().await;
    if active >= state.config.max_connections {
        warn!(
            active,
            max = state.config.max_connections,
            "connection limit reached, refusing upgrade"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "connection limit reached").into_response();
    }

    let registry = state.registry.clone();
    let config = state.config.clone();
    let shutdown = state.shutdown.token();
    ws.on_upgrade(move |socket| {
        run_ws_session(socket, ConnectionId::new(), registry, config, shutdown)
    })
}
