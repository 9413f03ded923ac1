//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    batch::BatchCommands, completions::CompletionsArgs, config::ConfigCommands,
    init::InitArgs, product::ProductCommands, serve::ServeArgs, status::StatusArgs,
};

#[derive(Parser)]
#[command(name = "ptrack")]
#[command(author, version, about = "Production batch tracker")]
#[command(
    long_about = "Record products and production batches in a local SQLite database, search and export them, or serve them over a small JSON API."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .ptrack/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new project
    Init(InitArgs),

    /// Product catalogue
    #[command(subcommand)]
    Product(ProductCommands),

    /// Production batches
    #[command(subcommand)]
    Batch(BatchCommands),

    /// Show production dashboard
    Status(StatusArgs),

    /// Serve the JSON API over HTTP
    Serve(ServeArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (tsv for lists)
    #[default]
    Auto,
    /// Tab-aligned columns (for terminals and piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// YAML format
    Yaml,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default, falling back to `fallback`
    pub fn resolve(self, configured: Option<&str>, fallback: OutputFormat) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|s| OutputFormat::from_str(s.trim(), true).ok())
            .filter(|f| *f != OutputFormat::Auto)
            .unwrap_or(fallback)
    }
}
