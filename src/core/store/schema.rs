//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{Store, StoreError, SCHEMA_VERSION};

impl Store {
    /// Create tables if missing and record the schema version
    pub(super) fn init_schema(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                part_number TEXT NOT NULL UNIQUE,
                product_type TEXT NOT NULL
                    CHECK (product_type IN ('AIR_FILTER', 'OIL_FILTER', 'AIR_OIL_SEPARATOR')),
                description TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS production_batches (
                id INTEGER PRIMARY KEY,
                batch_code TEXT NOT NULL UNIQUE,
                product_id INTEGER NOT NULL REFERENCES products(id),
                quantity INTEGER NOT NULL CHECK (quantity > 0),
                produced_by TEXT,
                production_line TEXT,
                remarks TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_batches_product ON production_batches(product_id);
            CREATE INDEX IF NOT EXISTS idx_batches_created ON production_batches(created_at);
            "#,
        )?;

        let found: Option<i32> = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();

        match found {
            None => {
                self.conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(v) if v > SCHEMA_VERSION => {
                return Err(StoreError::SchemaTooNew {
                    found: v,
                    supported: SCHEMA_VERSION,
                });
            }
            Some(_) => {}
        }

        Ok(())
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> Result<i32, StoreError> {
        let version = self
            .conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get::<_, Option<i32>>(0)
            })?
            .unwrap_or(0);
        Ok(version)
    }
}
