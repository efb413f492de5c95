//! # pulse-core
//!
//! Shared foundation types for the Pulse backend: branded ID newtypes and
//! timestamp helpers used by the store and server crates.

#![deny(unsafe_code)]

pub mod ids;
pub mod time;

pub use ids::{ConnectionId, ContactId};
pub use time::now_rfc3339;
