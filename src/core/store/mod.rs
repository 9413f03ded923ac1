//! SQLite-backed record store
//!
//! The store owns products and production batches. It is opened once per
//! command (or once per server process) and passed explicitly to every
//! service operation; there is no global handle.
//!
//! Uniqueness of part numbers and batch codes is enforced by UNIQUE
//! constraints. Constraint failures are surfaced as
//! [`StoreError::UniqueViolation`] so callers never need a separate
//! lookup-then-insert.

mod queries;
mod schema;

pub use queries::{BatchInsert, ProductInsert};

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{ffi, Connection};
use thiserror::Error;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// The record store backed by SQLite
pub struct Store {
    conn: Connection,
}

/// Errors raised by the store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("referenced {0} does not exist")]
    MissingReference(&'static str),

    #[error("database schema version {found} is newer than this build supports ({supported})")]
    SchemaTooNew { found: i32, supported: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(code, message) = &err {
            match code.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    return StoreError::UniqueViolation(
                        message.clone().unwrap_or_else(|| "UNIQUE".to_string()),
                    );
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    return StoreError::MissingReference("row");
                }
                _ => {}
            }
        }
        StoreError::Sqlite(err)
    }
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory store (tests and dry runs)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }
}

/// Format a timestamp for storage
///
/// Fixed-width UTC with microseconds, so text ordering equals time ordering.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    #[test]
    fn test_timestamp_format_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 15, 8, 30, 0).unwrap();
        let stored = format_timestamp(&ts);
        assert_eq!(stored, "2026-02-15T08:30:00.000000Z");
        assert_eq!(parse_timestamp(&stored), Some(ts));
    }

    #[test]
    fn test_timestamp_text_order_matches_time_order() {
        let earlier = Utc.with_ymd_and_hms(2026, 2, 15, 8, 30, 0).unwrap();
        let later = earlier + chrono::Duration::microseconds(1);
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_open_creates_database_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested/ptrack.db");
        Store::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_reopen_keeps_schema_version() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("ptrack.db");
        {
            let store = Store::open(&path).unwrap();
            assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    }
}
