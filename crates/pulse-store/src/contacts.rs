//! Contact store — persistence for contact form submissions.
//!
//! High-level API over the connection pool. Each method checks out a pooled
//! connection for the duration of one statement.

use rusqlite::{OptionalExtension, params};
use tracing::debug;

use pulse_core::{ContactId, now_rfc3339};

use crate::connection::ConnectionPool;
use crate::errors::{Result, StoreError};

/// A contact submission as received from the form.
#[derive(Clone, Debug, Default)]
pub struct NewContact {
    /// Submitter name.
    pub name: String,
    /// Submitter email address.
    pub email: String,
    /// Free-form message body.
    pub message: String,
}

/// A persisted contact row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactRecord {
    /// Assigned ID.
    pub id: ContactId,
    /// Submitter name.
    pub name: String,
    /// Submitter email address.
    pub email: String,
    /// Free-form message body.
    pub message: String,
    /// RFC 3339 timestamp assigned at insert.
    pub created_at: String,
}

/// Contact store backed by the shared connection pool.
#[derive(Clone)]
pub struct ContactStore {
    pool: ConnectionPool,
}

impl ContactStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Persist a submission, assigning it a fresh ID and timestamp.
    pub fn insert(&self, contact: NewContact) -> Result<ContactRecord> {
        let record = ContactRecord {
            id: ContactId::new(),
            name: contact.name,
            email: contact.email,
            message: contact.message,
            created_at: now_rfc3339(),
        };

        let conn = self.pool.get()?;
        let _ = conn.execute(
            "INSERT INTO contacts (id, name, email, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id.as_str(),
                record.name,
                record.email,
                record.message,
                record.created_at
            ],
        )?;

        debug!(id = %record.id, "contact saved");
        Ok(record)
    }

    /// Fetch a single contact by ID.
    pub fn get(&self, id: &ContactId) -> Result<ContactRecord> {
        let conn = self.pool.get()?;
        conn.query_row(
            "SELECT id, name, email, message, created_at
             FROM contacts WHERE id = ?1",
            params![id.as_str()],
            map_row,
        )
        .optional()?
        .ok_or_else(|| StoreError::ContactNotFound(id.to_string()))
    }

    /// List the most recent contacts, newest first.
    pub fn list(&self, limit: usize) -> Result<Vec<ContactRecord>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, message, created_at
             FROM contacts ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Total number of stored contacts.
    pub fn count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Map a rusqlite row to a [`ContactRecord`].
fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContactRecord> {
    Ok(ContactRecord {
        id: ContactId::from(row.get::<_, String>(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        message: row.get(3)?,
        created_at: row.get(4)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
