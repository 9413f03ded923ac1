//! ptrack: production batch tracking
//!
//! Records filter products and the production batches made from them in a
//! per-project SQLite database, with a CLI and a small JSON API on top.

pub mod cli;
pub mod core;
pub mod entities;
pub mod server;
