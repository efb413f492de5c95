//! # pulse-settings
//!
//! Layered configuration for the Pulse backend.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`PulseSettings::default()`]
//! 2. **User file** — `~/.pulse/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `PULSE_*` overrides (highest priority)
//!
//! Command-line flags sit above all three layers; the binary applies them
//! after calling [`load_settings`].

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let _settings = PulseSettings::default();
        let _path = settings_path();
    }

    #[test]
    fn default_settings_are_valid() {
        let settings = PulseSettings::default();
        assert_eq!(settings.version, "0.1.0");
        assert_eq!(settings.name, "pulse");
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 3040);
        assert_eq!(settings.server.max_connections, 50);
        assert_eq!(settings.push.tick_interval_ms, 1000);
        assert_eq!(settings.push.outbound_queue, 64);
        assert_eq!(settings.database.pool_size, 16);
        assert!(settings.database.path.is_none());
        assert!(!settings.logging.json);
    }

    #[test]
    fn settings_path_ends_with_expected_suffix() {
        let path = settings_path();
        assert!(path.ends_with(".pulse/settings.json"));
    }
}
