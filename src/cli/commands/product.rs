//! `ptrack product` command - Product catalogue

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{non_empty, open_workspace, print_structured};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::search::product_matches;
use crate::core::service;
use crate::core::validation::{field_error, validate_product};
use crate::entities::{NewProduct, Product, ProductType};

/// CLI-friendly product type enum
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliProductType {
    AirFilter,
    OilFilter,
    AirOilSeparator,
}

impl From<CliProductType> for ProductType {
    fn from(cli: CliProductType) -> Self {
        match cli {
            CliProductType::AirFilter => ProductType::AirFilter,
            CliProductType::OilFilter => ProductType::OilFilter,
            CliProductType::AirOilSeparator => ProductType::AirOilSeparator,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products with filtering
    List(ListArgs),

    /// Register a new product
    New(NewArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search part number, type and description (ignores spaces and case)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by product type
    #[arg(long = "type", short = 't')]
    pub product_type: Option<CliProductType>,

    /// Show only the count
    #[arg(long)]
    pub count: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Part number (stored uppercase)
    #[arg(long, short = 'p')]
    pub part_number: Option<String>,

    /// Product type
    #[arg(long = "type", short = 't')]
    pub product_type: Option<CliProductType>,

    /// Free-text description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Prompt for each field
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("part_number", "PART NUMBER", 20),
    ColumnDef::new("type", "TYPE", 18),
    ColumnDef::new("description", "DESCRIPTION", 40),
    ColumnDef::new("created", "CREATED", 14),
];

/// Run a product subcommand
pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::New(args) => run_new(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let ws = open_workspace(global)?;
    let format = global
        .format
        .resolve(ws.config.default_format.as_deref(), OutputFormat::Tsv);

    let products = service::list_products(&ws.store)?;
    let query = args.search.as_deref();
    let type_filter = args.product_type.map(ProductType::from);

    let mut shown: Vec<&Product> = products
        .iter()
        .filter(|p| query.map_or(true, |q| product_matches(p, q)))
        .filter(|p| type_filter.map_or(true, |t| p.product_type == t))
        .collect();

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
        if products.is_empty() {
            println!("No products yet.");
        } else {
            println!("No products found.");
        }
        return Ok(());
    }

    let rows: Vec<TableRow> = shown
        .iter()
        .map(|p| {
            TableRow::new(p.id)
                .cell("part_number", CellValue::matched(&p.part_number, query))
                .cell("type", CellValue::Type(p.product_type))
                .cell(
                    "description",
                    match p.description.as_deref() {
                        Some(d) => CellValue::matched(d, query),
                        None => CellValue::Empty,
                    },
                )
                .cell("created", CellValue::Date(p.created_at))
        })
        .collect();

    TableFormatter::new(COLUMNS, "product")
        .with_summary(!global.quiet)
        .output(
            &rows,
            format,
            &["part_number", "type", "description", "created"],
        );
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = open_workspace(global)?;

    let input = if args.interactive {
        prompt_product(args)?
    } else {
        NewProduct {
            part_number: args.part_number,
            product_type: args
                .product_type
                .map(|t| ProductType::from(t).as_str().to_string()),
            description: args.description,
        }
    };

    let product = service::create_product(&mut ws.store, input)?;

    if print_structured(&product, global.format)? {
        return Ok(());
    }
    match global.format {
        OutputFormat::Id => println!("{}", product.id),
        _ => {
            println!(
                "{} Created product {} (id {})",
                style("✓").green(),
                style(&product.part_number).cyan(),
                product.id
            );
            if !global.quiet {
                println!(
                    "   {} | {}",
                    style(product.product_type.label()).yellow(),
                    style(product.description.as_deref().unwrap_or("(no description)")).dim()
                );
            }
        }
    }
    Ok(())
}

/// Collect product fields interactively, re-prompting on field errors
fn prompt_product(args: NewArgs) -> Result<NewProduct> {
    let theme = ColorfulTheme::default();

    println!();
    println!("{} Register a new product", style("◆").cyan());
    println!("{}", style("─".repeat(50)).dim());

    let part_number: String = Input::with_theme(&theme)
        .with_prompt("Part number")
        .with_initial_text(args.part_number.unwrap_or_default())
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            let probe = NewProduct::new(input.as_str(), ProductType::AirFilter.as_str());
            match field_error(&validate_product(&probe).errors, "part_number") {
                Some(msg) => Err(msg.to_string()),
                None => Ok(()),
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let labels: Vec<&str> = ProductType::ALL.iter().map(|t| t.label()).collect();
    let default_idx = args
        .product_type
        .map(ProductType::from)
        .and_then(|t| ProductType::ALL.iter().position(|x| *x == t))
        .unwrap_or(0);
    let type_idx = Select::with_theme(&theme)
        .with_prompt("Product type")
        .items(&labels)
        .default(default_idx)
        .interact()
        .into_diagnostic()?;

    let description: String = Input::with_theme(&theme)
        .with_prompt("Description (optional)")
        .with_initial_text(args.description.unwrap_or_default())
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            let probe = NewProduct::new("XX", ProductType::AirFilter.as_str())
                .with_description(input.as_str());
            match field_error(&validate_product(&probe).errors, "description") {
                Some(msg) => Err(msg.to_string()),
                None => Ok(()),
            }
        })
        .interact_text()
        .into_diagnostic()?;

    Ok(NewProduct {
        part_number: Some(part_number),
        product_type: Some(ProductType::ALL[type_idx].as_str().to_string()),
        description: non_empty(description),
    })
}
