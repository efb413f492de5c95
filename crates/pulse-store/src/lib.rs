//! # pulse-store
//!
//! `SQLite`-backed persistence for the Pulse backend.
//!
//! - **Connection pool**: `r2d2` + `rusqlite` with WAL mode and pragmas
//! - **Migrations**: version-tracked SQL schema evolution via `include_str!`
//! - **Contact store**: insert/get/list/count for contact form submissions

#![deny(unsafe_code)]

pub mod connection;
pub mod contacts;
pub mod errors;
pub mod migrations;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use contacts::{ContactRecord, ContactStore, NewContact};
pub use errors::{Result, StoreError};
pub use migrations::{current_version, latest_version, run_migrations};
