//! Store error types.

use thiserror::Error;

/// Errors that can occur in the contact store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying `SQLite` error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Connection pool error (exhausted or connection failed).
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    /// Schema migration failed.
    #[error("migration failed: {message}")]
    Migration {
        /// Details of what went wrong.
        message: String,
    },
    /// No contact exists with the given ID.
    #[error("contact not found: {0}")]
    ContactNotFound(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_error_display() {
        let err = StoreError::Migration {
            message: "v1 failed".to_string(),
        };
        assert_eq!(err.to_string(), "migration failed: v1 failed");
    }

    #[test]
    fn not_found_display() {
        let err = StoreError::ContactNotFound("abc".to_string());
        assert_eq!(err.to_string(), "contact not found: abc");
    }

    #[test]
    fn sqlite_error_from_conversion() {
        let sqlite_err = rusqlite::Error::QueryReturnedNoRows;
        let err: StoreError = sqlite_err.into();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }
}
