//! Timestamp helpers.

use chrono::Utc;

/// Current UTC time as an RFC 3339 string, the format used in store rows.
#[must_use]
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
