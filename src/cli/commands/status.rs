//! `ptrack status` command - Production dashboard

use console::style;
use miette::Result;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{open_workspace, print_structured};
use crate::cli::helpers::{format_date, or_dash};
use crate::cli::GlobalOpts;
use crate::core::service;
use crate::entities::{BatchWithProduct, Product, ProductType};

/// Number of batches shown under "Recent batches"
const RECENT_LIMIT: usize = 5;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Number of recent batches to show
    #[arg(long, default_value_t = RECENT_LIMIT)]
    pub recent: usize,
}

/// Per-type product count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub product_type: ProductType,
    pub count: usize,
}

/// Summary figures for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_batches: usize,
    /// Sum of batch quantities, saturating at `i64::MAX`
    pub total_quantity: i64,
    pub total_products: usize,
    pub products_by_type: Vec<TypeCount>,
    pub recent_batches: Vec<BatchWithProduct>,
}

impl DashboardStats {
    /// Compute stats from the full lists; `batches` must be newest first
    pub fn compute(products: &[Product], batches: &[BatchWithProduct], recent: usize) -> Self {
        let products_by_type = ProductType::ALL
            .iter()
            .map(|t| TypeCount {
                product_type: *t,
                count: products.iter().filter(|p| p.product_type == *t).count(),
            })
            .collect();

        Self {
            total_batches: batches.len(),
            total_quantity: batches
                .iter()
                .fold(0i64, |acc, b| acc.saturating_add(b.batch.quantity)),
            total_products: products.len(),
            products_by_type,
            recent_batches: batches.iter().take(recent).cloned().collect(),
        }
    }
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let products = service::list_products(&ws.store)?;
    let batches = service::list_batches(&ws.store)?;
    let stats = DashboardStats::compute(&products, &batches, args.recent);

    if print_structured(&stats, global.format)? {
        return Ok(());
    }

    print!("{}", render_dashboard(&stats));
    Ok(())
}

/// Render the dashboard as text with markdown tables
fn render_dashboard(stats: &DashboardStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", style("Production Status").bold().underlined()));
    out.push_str(&format!("{}\n\n", "═".repeat(40)));

    out.push_str(&format!(
        "  {:<16} {}\n",
        "Batches",
        style(stats.total_batches).cyan().bold()
    ));
    out.push_str(&format!(
        "  {:<16} {} pcs\n",
        "Produced",
        style(stats.total_quantity).cyan().bold()
    ));
    out.push_str(&format!(
        "  {:<16} {}\n\n",
        "Products",
        style(stats.total_products).cyan().bold()
    ));

    let mut by_type = Builder::default();
    by_type.push_record(["Product Type", "Products"]);
    for tc in &stats.products_by_type {
        by_type.push_record([tc.product_type.label().to_string(), tc.count.to_string()]);
    }
    out.push_str(&by_type.build().with(Style::markdown()).to_string());
    out.push_str("\n\n");

    out.push_str(&format!("{}\n\n", style("Recent batches").bold()));
    if stats.recent_batches.is_empty() {
        out.push_str("No batches yet.\n");
        return out;
    }

    let mut recent = Builder::default();
    recent.push_record(["Batch Code", "Part Number", "Qty", "Line", "Created"]);
    for b in &stats.recent_batches {
        recent.push_record([
            b.batch.batch_code.clone(),
            or_dash(b.part_number.as_deref()).to_string(),
            b.batch.quantity.to_string(),
            or_dash(b.batch.production_line.as_deref()).to_string(),
            format_date(&b.batch.created_at),
        ]);
    }
    out.push_str(&recent.build().with(Style::markdown()).to_string());
    out.push('\n');
    out
}
