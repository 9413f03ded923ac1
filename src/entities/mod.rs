//! Entity type definitions
//!
//! Production Tracker records two entity types:
//!
//! - [`Product`] - A catalogued part identified by a unique part number
//! - [`ProductionBatch`] - A production run of one product, identified by a batch code
//!
//! Each type comes with an untyped `New*` input used by forms and the HTTP API.

pub mod batch;
pub mod product;

pub use batch::{BatchWithProduct, NewBatch, ProductionBatch};
pub use product::{NewProduct, Product, ProductType};
