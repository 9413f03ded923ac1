//! Form validation rules for products and batches
//!
//! Validators never fail fast: every rule is checked and all violations are
//! returned together so a form can show each field's error at once.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{NewBatch, NewProduct, ProductType};

/// Maximum length of free-text fields (description, remarks)
pub const MAX_TEXT_LEN: usize = 500;

/// Minimum trimmed length of a part number
pub const MIN_PART_NUMBER_LEN: usize = 2;

/// A single field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating one input record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }
}

/// Validate product form data
pub fn validate_product(data: &NewProduct) -> ValidationResult {
    let mut result = ValidationResult::default();

    match data.part_number.as_deref().map(str::trim) {
        None | Some("") => result.push("part_number", "Part number is required"),
        Some(pn) if pn.chars().count() < MIN_PART_NUMBER_LEN => result.push(
            "part_number",
            "Part number must be at least 2 characters",
        ),
        Some(_) => {}
    }

    match data.product_type.as_deref() {
        None | Some("") => result.push("product_type", "Product type is required"),
        Some(code) if code.parse::<ProductType>().is_err() => result.push(
            "product_type",
            "Product type must be AIR_FILTER, OIL_FILTER, or AIR_OIL_SEPARATOR",
        ),
        Some(_) => {}
    }

    if exceeds_text_limit(data.description.as_deref()) {
        result.push("description", "Description must be 500 characters or less");
    }

    result
}

/// Validate batch form data
///
/// `batch_code` is intentionally not checked here; any caller-supplied code
/// is accepted.
pub fn validate_batch(data: &NewBatch) -> ValidationResult {
    let mut result = ValidationResult::default();

    match data.product_id.as_ref().filter(|v| !is_blank(v)) {
        None => result.push("product_id", "Please select a product"),
        Some(v) => match coerce_integer(v) {
            Some(0) => result.push("product_id", "Please select a product"),
            Some(id) if id > 0 => {}
            _ => result.push("product_id", "Product ID must be a positive integer"),
        },
    }

    match data.quantity.as_ref().filter(|v| !is_blank(v)) {
        None => result.push("quantity", "Quantity is required"),
        Some(v) => match coerce_integer(v) {
            Some(qty) if qty > 0 => {}
            _ => result.push("quantity", "Quantity must be a positive number"),
        },
    }

    if exceeds_text_limit(data.remarks.as_deref()) {
        result.push("remarks", "Remarks must be 500 characters or less");
    }

    result
}

/// Get the error message for a specific field
pub fn field_error<'a>(errors: &'a [FieldError], field: &str) -> Option<&'a str> {
    errors
        .iter()
        .find(|e| e.field == field)
        .map(|e| e.message.as_str())
}

/// Coerce a loosely-typed value to an integer
///
/// Accepts JSON integers, floats with no fractional part, and strings that
/// parse as a whole integer after trimming. Everything else yields `None`.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn exceeds_text_limit(text: Option<&str>) -> bool {
    text.is_some_and(|t| t.trim().chars().count() > MAX_TEXT_LEN)
}
