//! WebSocket push channel: per-connection state, the number ticker,
//! the connection registry, and the session loop.

pub mod connection;
pub mod registry;
pub mod session;
pub mod ticker;
