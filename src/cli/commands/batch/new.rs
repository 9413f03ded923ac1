//! `ptrack batch new`

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::cli::commands::utils::{non_empty, open_workspace, print_structured};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::search::filter_products;
use crate::core::service;
use crate::core::store::Store;
use crate::core::validation::{coerce_integer, field_error, validate_batch};
use crate::core::Config;
use crate::entities::{NewBatch, Product};

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Batch code (any unique text; see `ptrack batch code generate`)
    #[arg(long, short = 'c')]
    pub code: Option<String>,

    /// Product id or part number
    #[arg(long, short = 'p')]
    pub product: Option<String>,

    /// Quantity produced (positive integer)
    #[arg(long, short = 'n')]
    pub quantity: Option<String>,

    /// Operator (default: config `operator`)
    #[arg(long)]
    pub produced_by: Option<String>,

    /// Production line (default: config `production_line`)
    #[arg(long)]
    pub line: Option<String>,

    /// Free-text remarks
    #[arg(long, short = 'r')]
    pub remarks: Option<String>,

    /// Prompt for each field, with a product picker
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

pub(super) fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut ws = open_workspace(global)?;

    let input = if args.interactive {
        prompt_batch(args, &ws.store, &ws.config)?
    } else {
        let product_id = match args.product.as_deref() {
            Some(reference) => Some(resolve_product(&ws.store, reference)?),
            None => None,
        };
        NewBatch {
            batch_code: args.code,
            product_id,
            quantity: args.quantity.map(Value::String),
            produced_by: args.produced_by.or_else(|| ws.config.operator.clone()),
            production_line: args.line.or_else(|| ws.config.production_line.clone()),
            remarks: args.remarks,
        }
    };

    let batch = service::create_batch(&mut ws.store, input)?;

    if print_structured(&batch, global.format)? {
        return Ok(());
    }
    match global.format {
        OutputFormat::Id => println!("{}", batch.id),
        _ => {
            println!(
                "{} Recorded batch {} (id {})",
                style("✓").green(),
                style(&batch.batch_code).cyan(),
                batch.id
            );
            if !global.quiet {
                let part_number = ws
                    .store
                    .get_product(batch.product_id)
                    .into_diagnostic()?
                    .map(|p| p.part_number)
                    .unwrap_or_else(|| batch.product_id.to_string());
                println!(
                    "   {} x {}",
                    style(batch.quantity).yellow(),
                    style(part_number).white()
                );
            }
        }
    }
    Ok(())
}

/// Turn `--product` into a product id value
///
/// A matching part number wins; otherwise an integer is taken as an id and
/// left for the service to check.
fn resolve_product(store: &Store, reference: &str) -> Result<Value> {
    if let Some(product) = store
        .find_product_by_part_number(reference)
        .into_diagnostic()?
    {
        return Ok(Value::from(product.id));
    }
    let raw = Value::String(reference.to_string());
    if reference.trim().is_empty() || coerce_integer(&raw).is_some() {
        return Ok(raw);
    }
    Err(miette::miette!(
        help = "use `ptrack product list` to see registered part numbers",
        "Product not found: {}",
        reference
    ))
}

/// Collect batch fields interactively
fn prompt_batch(args: NewArgs, store: &Store, config: &Config) -> Result<NewBatch> {
    let theme = ColorfulTheme::default();
    let products = service::list_products(store)?;
    if products.is_empty() {
        return Err(miette::miette!(
            help = "register one with `ptrack product new`",
            "No products yet"
        ));
    }

    println!();
    println!("{} Record a production batch", style("◆").cyan());
    println!("{}", style("─".repeat(50)).dim());

    let product = pick_product(&theme, &products)?;

    let batch_code: String = Input::with_theme(&theme)
        .with_prompt("Batch code")
        .with_initial_text(args.code.unwrap_or_default())
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            if input.trim().is_empty() {
                Err("Batch code is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let quantity: String = Input::with_theme(&theme)
        .with_prompt("Quantity")
        .with_initial_text(args.quantity.unwrap_or_default())
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            let probe = NewBatch {
                product_id: Some(Value::from(product.id)),
                quantity: Some(Value::String(input.clone())),
                ..Default::default()
            };
            match field_error(&validate_batch(&probe).errors, "quantity") {
                Some(msg) => Err(msg.to_string()),
                None => Ok(()),
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let produced_by = prompt_optional(
        &theme,
        "Produced by",
        args.produced_by.or_else(|| config.operator.clone()),
    )?;
    let production_line = prompt_optional(
        &theme,
        "Production line",
        args.line.or_else(|| config.production_line.clone()),
    )?;

    let remarks: String = Input::with_theme(&theme)
        .with_prompt("Remarks (optional)")
        .with_initial_text(args.remarks.unwrap_or_default())
        .allow_empty(true)
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            let probe = NewBatch::default().with_remarks(input.as_str());
            match field_error(&validate_batch(&probe).errors, "remarks") {
                Some(msg) => Err(msg.to_string()),
                None => Ok(()),
            }
        })
        .interact_text()
        .into_diagnostic()?;

    Ok(NewBatch {
        batch_code: Some(batch_code),
        product_id: Some(Value::from(product.id)),
        quantity: Some(Value::String(quantity)),
        produced_by,
        production_line,
        remarks: non_empty(remarks),
    })
}

/// Filter the product list by a search term, then select one
fn pick_product<'a>(theme: &ColorfulTheme, products: &'a [Product]) -> Result<&'a Product> {
    loop {
        let term: String = Input::with_theme(theme)
            .with_prompt("Search products (blank for all)")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;

        let matches = filter_products(products, &term);
        if matches.is_empty() {
            println!("{} No products found.", style("!").yellow());
            continue;
        }

        let items: Vec<String> = matches
            .iter()
            .map(|p| match p.description.as_deref() {
                Some(d) => format!("{} - {} ({})", p.part_number, p.product_type.label(), d),
                None => format!("{} - {}", p.part_number, p.product_type.label()),
            })
            .collect();
        let idx = Select::with_theme(theme)
            .with_prompt("Product")
            .items(&items)
            .default(0)
            .interact()
            .into_diagnostic()?;
        return Ok(matches[idx]);
    }
}

fn prompt_optional(
    theme: &ColorfulTheme,
    prompt: &str,
    initial: Option<String>,
) -> Result<Option<String>> {
    let answer: String = Input::with_theme(theme)
        .with_prompt(format!("{} (optional)", prompt))
        .with_initial_text(initial.unwrap_or_default())
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;
    Ok(non_empty(answer))
}
