//! # pulse-server
//!
//! HTTP and WebSocket server for Pulse:
//!
//! - `GET /addTwoNumber` adds two integer query parameters
//! - `POST /contact` persists a contact submission
//! - `GET /ws` upgrades to a push channel emitting a random digit per second
//! - `GET /health` and `GET /metrics` for operations
//! - embedded static front page on `/`
//!
//! Every connection's push ticker is bound to a cancellation token that is
//! a child of the server shutdown token, and a background sweeper
//! force-cancels connections whose session died without cleanup.

#![deny(unsafe_code)]

pub mod assets;
pub mod config;
pub mod error;
pub mod health;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{AppState, PulseServer};
pub use shutdown::ShutdownCoordinator;
pub use websocket::connection::ClientConnection;
pub use websocket::registry::ConnectionRegistry;
