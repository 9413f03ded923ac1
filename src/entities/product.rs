//! Product entity - a catalogued part with a type classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Product classification (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    AirFilter,
    OilFilter,
    AirOilSeparator,
}

impl ProductType {
    /// Every product type, in display order
    pub const ALL: [ProductType; 3] = [
        ProductType::AirFilter,
        ProductType::OilFilter,
        ProductType::AirOilSeparator,
    ];

    /// Stored / wire code
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::AirFilter => "AIR_FILTER",
            ProductType::OilFilter => "OIL_FILTER",
            ProductType::AirOilSeparator => "AIR_OIL_SEPARATOR",
        }
    }

    /// Human-readable label used by forms and dashboards
    pub fn label(&self) -> &'static str {
        match self {
            ProductType::AirFilter => "Air Filter",
            ProductType::OilFilter => "Oil Filter",
            ProductType::AirOilSeparator => "Air Oil Separator",
        }
    }
}

impl std::fmt::Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProductType {
    type Err = String;

    /// Codes are matched exactly; anything else is outside the closed set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AIR_FILTER" => Ok(ProductType::AirFilter),
            "OIL_FILTER" => Ok(ProductType::OilFilter),
            "AIR_OIL_SEPARATOR" => Ok(ProductType::AirOilSeparator),
            _ => Err(format!(
                "Invalid product type: {}. Use AIR_FILTER, OIL_FILTER, or AIR_OIL_SEPARATOR",
                s
            )),
        }
    }
}

/// A stored product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// System-assigned identifier
    pub id: i64,

    /// Unique part number, always uppercase
    pub part_number: String,

    /// Classification
    pub product_type: ProductType,

    /// Free-form description (max 500 characters)
    #[serde(default)]
    pub description: Option<String>,

    /// Creation timestamp, never mutated
    pub created_at: DateTime<Utc>,
}

/// Untyped create-product input, as submitted by a form or request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub part_number: Option<String>,

    #[serde(default)]
    pub product_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl NewProduct {
    pub fn new(part_number: impl Into<String>, product_type: impl Into<String>) -> Self {
        Self {
            part_number: Some(part_number.into()),
            product_type: Some(product_type.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
