//! CLI command implementations

pub mod utils;

pub mod batch;
pub mod completions;
pub mod config;
pub mod init;
pub mod product;
pub mod serve;
pub mod status;
