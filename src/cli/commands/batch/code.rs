//! `ptrack batch code` - generate and parse standard batch codes

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::json;

use crate::cli::commands::utils::print_structured;
use crate::cli::helpers::format_human_date;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::batch_code::{generate_batch_code, generate_batch_code_on, parse_batch_code};

#[derive(Subcommand, Debug)]
pub enum CodeCommands {
    /// Print the next code for a part number
    Generate(GenerateArgs),

    /// Split a code into part number, date and sequence
    Parse(ParseArgs),
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Part number prefix
    pub part_number: String,

    /// Last sequence number already used that day
    #[arg(long, default_value_t = 0)]
    pub last_seq: u32,

    /// Production date (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,
}

#[derive(clap::Args, Debug)]
pub struct ParseArgs {
    /// Batch code to parse
    pub code: String,
}

pub(super) fn run(cmd: CodeCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CodeCommands::Generate(args) => {
            let code = match args.date {
                Some(date) => generate_batch_code_on(&args.part_number, args.last_seq, date),
                None => generate_batch_code(&args.part_number, args.last_seq),
            };
            println!("{}", code);
            Ok(())
        }
        CodeCommands::Parse(args) => {
            let parsed = parse_batch_code(&args.code).ok_or_else(|| {
                miette::miette!(
                    help = "expected PARTNUMBER-YYYYMMDD-SEQ, e.g. AB123-20260215-001",
                    "'{}' is not a standard batch code",
                    args.code
                )
            })?;

            let value = json!({
                "part_number": parsed.part_number,
                "date": parsed.date,
                "sequence": parsed.sequence,
            });
            if print_structured(&value, global.format)? {
                return Ok(());
            }
            match global.format {
                OutputFormat::Tsv | OutputFormat::Csv => {
                    let sep = if global.format == OutputFormat::Csv { "," } else { "\t" };
                    println!(
                        "{}{sep}{}{sep}{}",
                        parsed.part_number,
                        parsed.date,
                        parsed.sequence,
                        sep = sep
                    );
                }
                _ => {
                    println!("{}  {}", style("Part number:").bold(), parsed.part_number);
                    println!(
                        "{}         {}",
                        style("Date:").bold(),
                        format_human_date(parsed.date)
                    );
                    println!("{}     {}", style("Sequence:").bold(), parsed.sequence);
                }
            }
            Ok(())
        }
    }
}
