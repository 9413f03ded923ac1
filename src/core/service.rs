//! Record service - create and list operations for products and batches
//!
//! Every operation takes the store handle explicitly and runs as one
//! self-contained transaction. Failures are classified into the four
//! [`ServiceError`] kinds, each with a fixed HTTP status.

use chrono::Utc;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::store::{BatchInsert, ProductInsert, Store, StoreError};
use crate::core::validation::{
    coerce_integer, validate_batch, validate_product, FieldError, ValidationResult,
};
use crate::entities::{
    BatchWithProduct, NewBatch, NewProduct, Product, ProductType, ProductionBatch,
};

/// Errors returned by record service operations
#[derive(Debug, Error, Diagnostic)]
pub enum ServiceError {
    #[error("Validation failed: {}", summarize(.0))]
    #[diagnostic(
        code(ptrack::service::validation),
        help("correct the listed fields and submit again")
    )]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    #[diagnostic(code(ptrack::service::conflict))]
    Conflict(String),

    #[error("{0}")]
    #[diagnostic(code(ptrack::service::not_found))]
    NotFound(String),

    #[error("Internal error: {0}")]
    #[diagnostic(code(ptrack::service::internal))]
    Internal(#[from] StoreError),
}

impl ServiceError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable kind
    pub fn error_kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Internal(_) => "internal",
        }
    }

    /// Field errors, for validation failures
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ServiceError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// List all products in storage order
pub fn list_products(store: &Store) -> Result<Vec<Product>, ServiceError> {
    let products = store.list_products()?;
    debug!(count = products.len(), "listed products");
    Ok(products)
}

/// Create a product
///
/// The part number is trimmed and uppercased before validation, so
/// `"ab123"` is stored as `"AB123"` and case variants collide.
pub fn create_product(store: &mut Store, input: NewProduct) -> Result<Product, ServiceError> {
    let input = NewProduct {
        part_number: input.part_number.map(|pn| pn.trim().to_uppercase()),
        ..input
    };

    let validation = validate_product(&input);
    let (part_number, product_type) = match (&input.part_number, &input.product_type) {
        (Some(pn), Some(code)) if validation.is_valid() => match code.parse::<ProductType>() {
            Ok(product_type) => (pn.clone(), product_type),
            Err(_) => return Err(invalid(validation)),
        },
        _ => return Err(invalid(validation)),
    };

    let record = ProductInsert {
        part_number,
        product_type,
        description: non_blank(input.description),
        created_at: Utc::now(),
    };

    match store.insert_product(record) {
        Ok(product) => {
            info!(id = product.id, part_number = %product.part_number, "created product");
            Ok(product)
        }
        Err(StoreError::UniqueViolation(detail)) => {
            warn!(part_number = ?input.part_number, %detail, "duplicate part number");
            Err(ServiceError::Conflict("Part number already exists".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

/// List all batches joined with product fields, newest first
pub fn list_batches(store: &Store) -> Result<Vec<BatchWithProduct>, ServiceError> {
    let batches = store.list_batches()?;
    debug!(count = batches.len(), "listed batches");
    Ok(batches)
}

/// Create a production batch
///
/// Checks run in this order: required fields and quantity, product
/// existence, batch code uniqueness.
pub fn create_batch(store: &mut Store, input: NewBatch) -> Result<ProductionBatch, ServiceError> {
    let mut validation = validate_batch(&input);
    let batch_code = input
        .batch_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from);
    if batch_code.is_none() {
        validation
            .errors
            .insert(0, FieldError::new("batch_code", "Batch code is required"));
    }

    let product_id = input.product_id.as_ref().and_then(coerce_integer);
    let quantity = input.quantity.as_ref().and_then(coerce_integer);
    let (batch_code, product_id, quantity) = match (batch_code, product_id, quantity) {
        (Some(code), Some(pid), Some(qty)) if validation.is_valid() => (code, pid, qty),
        _ => return Err(invalid(validation)),
    };

    let record = BatchInsert {
        batch_code,
        product_id,
        quantity,
        produced_by: non_blank(input.produced_by),
        production_line: non_blank(input.production_line),
        remarks: non_blank(input.remarks),
        created_at: Utc::now(),
    };
    let code = record.batch_code.clone();

    match store.insert_batch(record) {
        Ok(batch) => {
            info!(
                id = batch.id,
                batch_code = %batch.batch_code,
                product_id = batch.product_id,
                quantity = batch.quantity,
                "created batch"
            );
            Ok(batch)
        }
        Err(StoreError::MissingReference(_)) => {
            warn!(product_id, batch_code = %code, "batch references unknown product");
            Err(ServiceError::NotFound("Product not found".to_string()))
        }
        Err(StoreError::UniqueViolation(detail)) => {
            warn!(batch_code = %code, %detail, "duplicate batch code");
            Err(ServiceError::Conflict("Batch code already exists".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn invalid(validation: ValidationResult) -> ServiceError {
    debug!(errors = validation.errors.len(), "rejected invalid input");
    ServiceError::Validation(validation.errors)
}

/// Treat empty or whitespace-only optional text as absent
fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
