//! Core module - project layout, configuration, records and the rules on them

pub mod batch_code;
pub mod config;
pub mod project;
pub mod search;
pub mod service;
pub mod store;
pub mod validation;

pub use config::Config;
pub use project::{Project, ProjectError};
pub use service::ServiceError;
pub use store::{Store, StoreError};
