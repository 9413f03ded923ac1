//! Production batch entity - a recorded production run of one product

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::product::ProductType;

/// A stored production batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionBatch {
    /// System-assigned identifier
    pub id: i64,

    /// Unique, caller-supplied batch code
    pub batch_code: String,

    /// Product this batch produced
    pub product_id: i64,

    /// Units produced (always > 0)
    pub quantity: i64,

    #[serde(default)]
    pub produced_by: Option<String>,

    #[serde(default)]
    pub production_line: Option<String>,

    /// Free-form remarks (max 500 characters)
    #[serde(default)]
    pub remarks: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Reserved for edit support; never set on creation
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A batch joined with the fields of its product
///
/// Product fields are optional because the join is a left join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWithProduct {
    #[serde(flatten)]
    pub batch: ProductionBatch,

    #[serde(default)]
    pub part_number: Option<String>,

    #[serde(default)]
    pub product_type: Option<ProductType>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Untyped create-batch input, as submitted by a form or request body
///
/// `product_id` and `quantity` are kept as raw JSON values so that both
/// numbers and numeric strings are accepted and coerced during validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBatch {
    #[serde(default)]
    pub batch_code: Option<String>,

    #[serde(default)]
    pub product_id: Option<serde_json::Value>,

    #[serde(default)]
    pub quantity: Option<serde_json::Value>,

    #[serde(default)]
    pub produced_by: Option<String>,

    #[serde(default)]
    pub production_line: Option<String>,

    #[serde(default)]
    pub remarks: Option<String>,
}

impl NewBatch {
    pub fn new(batch_code: impl Into<String>, product_id: i64, quantity: i64) -> Self {
        Self {
            batch_code: Some(batch_code.into()),
            product_id: Some(product_id.into()),
            quantity: Some(quantity.into()),
            ..Default::default()
        }
    }

    pub fn with_produced_by(mut self, produced_by: impl Into<String>) -> Self {
        self.produced_by = Some(produced_by.into());
        self
    }

    pub fn with_production_line(mut self, line: impl Into<String>) -> Self {
        self.production_line = Some(line.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}
