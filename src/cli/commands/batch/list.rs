//! `ptrack batch list`

use miette::Result;

use crate::cli::commands::utils::{open_workspace, print_structured};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::search::filter_batches;
use crate::core::service;
use crate::entities::BatchWithProduct;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search batch code and part number (ignores spaces and case)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Include produced-by, line, remarks and updated columns
    #[arg(long)]
    pub details: bool,

    /// Show only the count
    #[arg(long)]
    pub count: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("code", "BATCH CODE", 24),
    ColumnDef::new("part_number", "PART NUMBER", 18),
    ColumnDef::new("type", "TYPE", 18),
    ColumnDef::new("quantity", "QTY", 10),
    ColumnDef::new("produced_by", "PRODUCED BY", 16),
    ColumnDef::new("line", "LINE", 12),
    ColumnDef::new("remarks", "REMARKS", 30),
    ColumnDef::new("created", "CREATED", 14),
    ColumnDef::new("updated", "UPDATED", 14),
];

const SUMMARY_COLUMNS: &[&str] = &["code", "part_number", "type", "quantity", "created"];

const DETAIL_COLUMNS: &[&str] = &[
    "code",
    "part_number",
    "type",
    "quantity",
    "produced_by",
    "line",
    "remarks",
    "created",
    "updated",
];

pub(super) fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let format = global
        .format
        .resolve(ws.config.default_format.as_deref(), OutputFormat::Tsv);

    let batches = service::list_batches(&ws.store)?;
    let query = args.search.as_deref();
    let mut shown = match query {
        Some(q) => filter_batches(&batches, q),
        None => batches.iter().collect(),
    };

    if let Some(limit) = args.limit {
        shown.truncate(limit);
    }

    if args.count {
        println!("{}", shown.len());
        return Ok(());
    }

    if print_structured(&shown, format)? {
        return Ok(());
    }

    if shown.is_empty() {
        if batches.is_empty() {
            println!("No batches yet.");
        } else {
            println!("No batches found.");
        }
        return Ok(());
    }

    let rows: Vec<TableRow> = shown.iter().map(|b| batch_row(b, query)).collect();
    let visible = if args.details {
        DETAIL_COLUMNS
    } else {
        SUMMARY_COLUMNS
    };

    TableFormatter::new(COLUMNS, "batch")
        .with_summary(!global.quiet)
        .output(&rows, format, visible);
    Ok(())
}

fn batch_row(b: &BatchWithProduct, query: Option<&str>) -> TableRow {
    let batch = &b.batch;
    TableRow::new(batch.id)
        .cell("code", CellValue::matched(&batch.batch_code, query))
        .cell(
            "part_number",
            match b.part_number.as_deref() {
                Some(pn) => CellValue::matched(pn, query),
                None => CellValue::Empty,
            },
        )
        .cell(
            "type",
            b.product_type.map_or(CellValue::Empty, CellValue::Type),
        )
        .cell("quantity", CellValue::Number(batch.quantity))
        .cell("produced_by", CellValue::optional(batch.produced_by.as_deref()))
        .cell("line", CellValue::optional(batch.production_line.as_deref()))
        .cell("remarks", CellValue::optional(batch.remarks.as_deref()))
        .cell("created", CellValue::Date(batch.created_at))
        .cell(
            "updated",
            batch.updated_at.map_or(CellValue::Empty, CellValue::Date),
        )
}
