//! `ptrack batch` command - Production batch records

mod code;
mod export;
mod list;
mod new;

use clap::Subcommand;
use miette::Result;

use crate::cli::GlobalOpts;

pub use code::{CodeCommands, GenerateArgs, ParseArgs};
pub use export::{export_filename, write_export, ExportArgs};
pub use list::ListArgs;
pub use new::NewArgs;

#[derive(Subcommand, Debug)]
pub enum BatchCommands {
    /// List batches, newest first
    List(ListArgs),

    /// Record a new production batch
    New(NewArgs),

    /// Export batches to a CSV spreadsheet
    Export(ExportArgs),

    /// Batch code utilities (PARTNUMBER-YYYYMMDD-SEQ)
    #[command(subcommand)]
    Code(CodeCommands),
}

/// Run a batch subcommand
pub fn run(cmd: BatchCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BatchCommands::List(args) => list::run(args, global),
        BatchCommands::New(args) => new::run(args, global),
        BatchCommands::Export(args) => export::run(args, global),
        BatchCommands::Code(cmd) => code::run(cmd, global),
    }
}
