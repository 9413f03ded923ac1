//! Insert and query methods for products and batches

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use super::{format_timestamp, parse_timestamp, Store, StoreError};
use crate::entities::{BatchWithProduct, Product, ProductType, ProductionBatch};

/// Normalized product fields ready for insertion
#[derive(Debug, Clone)]
pub struct ProductInsert {
    pub part_number: String,
    pub product_type: ProductType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Normalized batch fields ready for insertion
#[derive(Debug, Clone)]
pub struct BatchInsert {
    pub batch_code: String,
    pub product_id: i64,
    pub quantity: i64,
    pub produced_by: Option<String>,
    pub production_line: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

const PRODUCT_COLUMNS: &str = "id, part_number, product_type, description, created_at";

impl Store {
    /// Insert a product
    ///
    /// A duplicate part number fails with [`StoreError::UniqueViolation`].
    pub fn insert_product(&mut self, record: ProductInsert) -> Result<Product, StoreError> {
        let created_at = record.created_at.trunc_subsecs(6);
        self.conn.execute(
            "INSERT INTO products (part_number, product_type, description, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.part_number,
                record.product_type.as_str(),
                record.description,
                format_timestamp(&created_at),
            ],
        )?;

        Ok(Product {
            id: self.conn.last_insert_rowid(),
            part_number: record.part_number,
            product_type: record.product_type,
            description: record.description,
            created_at,
        })
    }

    /// Insert a batch
    ///
    /// The product lookup and the insert run in one immediate transaction.
    /// A missing product fails with [`StoreError::MissingReference`] before
    /// the batch code is considered; a duplicate code fails with
    /// [`StoreError::UniqueViolation`].
    pub fn insert_batch(&mut self, record: BatchInsert) -> Result<ProductionBatch, StoreError> {
        let created_at = record.created_at.trunc_subsecs(6);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let product_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = ?1)",
            params![record.product_id],
            |row| row.get(0),
        )?;
        if !product_exists {
            return Err(StoreError::MissingReference("product"));
        }

        tx.execute(
            "INSERT INTO production_batches
                (batch_code, product_id, quantity, produced_by, production_line, remarks, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.batch_code,
                record.product_id,
                record.quantity,
                record.produced_by,
                record.production_line,
                record.remarks,
                format_timestamp(&created_at),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(ProductionBatch {
            id,
            batch_code: record.batch_code,
            product_id: record.product_id,
            quantity: record.quantity,
            produced_by: record.produced_by,
            production_line: record.production_line,
            remarks: record.remarks,
            created_at,
            updated_at: None,
        })
    }

    /// All products in storage order
    pub fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))?;
        let products = stmt
            .query_map([], map_product)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }

    /// Get a product by id
    pub fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS),
                params![id],
                map_product,
            )
            .optional()?)
    }

    /// Find a product by part number (case-insensitive)
    pub fn find_product_by_part_number(
        &self,
        part_number: &str,
    ) -> Result<Option<Product>, StoreError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM products WHERE part_number = ?1",
                    PRODUCT_COLUMNS
                ),
                params![part_number.trim().to_uppercase()],
                map_product,
            )
            .optional()?)
    }

    /// All batches with product fields, newest first
    pub fn list_batches(&self) -> Result<Vec<BatchWithProduct>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT b.id, b.batch_code, b.product_id, b.quantity, b.produced_by,
                      b.production_line, b.remarks, b.created_at, b.updated_at,
                      p.part_number, p.product_type, p.description
               FROM production_batches b
               LEFT JOIN products p ON b.product_id = p.id
               ORDER BY b.created_at DESC, b.id DESC"#,
        )?;

        let rows = stmt.query_map([], |row| {
            let product_type = row
                .get::<_, Option<String>>(10)?
                .map(|code| parse_product_type(10, &code))
                .transpose()?;
            let updated_at = row
                .get::<_, Option<String>>(8)?
                .map(|s| timestamp_column(8, &s))
                .transpose()?;

            Ok(BatchWithProduct {
                batch: ProductionBatch {
                    id: row.get(0)?,
                    batch_code: row.get(1)?,
                    product_id: row.get(2)?,
                    quantity: row.get(3)?,
                    produced_by: row.get(4)?,
                    production_line: row.get(5)?,
                    remarks: row.get(6)?,
                    created_at: timestamp_column(7, &row.get::<_, String>(7)?)?,
                    updated_at,
                },
                part_number: row.get(9)?,
                product_type,
                description: row.get(11)?,
            })
        })?;

        let batches = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }
}

fn map_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        part_number: row.get(1)?,
        product_type: parse_product_type(2, &row.get::<_, String>(2)?)?,
        description: row.get(3)?,
        created_at: timestamp_column(4, &row.get::<_, String>(4)?)?,
    })
}

fn parse_product_type(idx: usize, code: &str) -> rusqlite::Result<ProductType> {
    code.parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

fn timestamp_column(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    parse_timestamp(s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("invalid timestamp: {}", s).into(),
        )
    })
}
