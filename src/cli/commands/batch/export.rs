//! `ptrack batch export` - spreadsheet export of the batch list

use chrono::{NaiveDate, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::cli::commands::utils::open_workspace;
use crate::cli::helpers::{format_date, or_dash};
use crate::cli::GlobalOpts;
use crate::core::search::filter_batches;
use crate::core::service;
use crate::entities::BatchWithProduct;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Export only batches matching this search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Output file (default: production_batches_YYYY-MM-DD.csv)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// One spreadsheet row; absent values are written as "-"
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Batch Code")]
    batch_code: &'a str,
    #[serde(rename = "Part Number")]
    part_number: &'a str,
    #[serde(rename = "Product Type")]
    product_type: &'a str,
    #[serde(rename = "Quantity")]
    quantity: i64,
    #[serde(rename = "Produced By")]
    produced_by: &'a str,
    #[serde(rename = "Production Line")]
    production_line: &'a str,
    #[serde(rename = "Remarks")]
    remarks: &'a str,
    #[serde(rename = "Created At")]
    created_at: String,
    #[serde(rename = "Updated At")]
    updated_at: String,
}

impl<'a> From<&'a BatchWithProduct> for ExportRow<'a> {
    fn from(b: &'a BatchWithProduct) -> Self {
        let batch = &b.batch;
        Self {
            batch_code: &batch.batch_code,
            part_number: or_dash(b.part_number.as_deref()),
            product_type: b.product_type.map_or("-", |t| t.as_str()),
            quantity: batch.quantity,
            produced_by: or_dash(batch.produced_by.as_deref()),
            production_line: or_dash(batch.production_line.as_deref()),
            remarks: or_dash(batch.remarks.as_deref()),
            created_at: format_date(&batch.created_at),
            updated_at: batch
                .updated_at
                .as_ref()
                .map_or_else(|| "-".to_string(), format_date),
        }
    }
}

/// Default export file name for a date
pub fn export_filename(date: NaiveDate) -> String {
    format!("production_batches_{}.csv", date.format("%Y-%m-%d"))
}

/// Write batches as CSV with a header row
pub fn write_export<W: Write>(batches: &[&BatchWithProduct], writer: W) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for batch in batches {
        wtr.serialize(ExportRow::from(*batch))?;
    }
    wtr.flush()?;
    Ok(())
}

pub(super) fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let batches = service::list_batches(&ws.store)?;
    let shown = match args.search.as_deref() {
        Some(q) => filter_batches(&batches, q),
        None => batches.iter().collect(),
    };

    if shown.is_empty() {
        return Err(miette::miette!("No batches to export"));
    }

    let path = args
        .output
        .unwrap_or_else(|| PathBuf::from(export_filename(Utc::now().date_naive())));
    let file = File::create(&path).into_diagnostic()?;
    write_export(&shown, file).into_diagnostic()?;

    tracing::info!(path = %path.display(), rows = shown.len(), "exported batches");
    if !global.quiet {
        println!(
            "{} Exported {} batch(es) to {}",
            style("✓").green(),
            shown.len(),
            style(path.display()).cyan()
        );
    }
    Ok(())
}
