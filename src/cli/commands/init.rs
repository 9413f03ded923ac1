//! `ptrack init` command - Initialize a new production tracking project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::project::{Project, ProjectError};
use crate::core::store::Store;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Rewrite .ptrack/config.yaml even if the project exists (records are kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            let config = Config::load(Some(&project));
            let db_path = config.database_path(&project);
            let store = Store::open(&db_path).into_diagnostic()?;
            let schema = store.schema_version().into_diagnostic()?;
            tracing::info!(root = %project.root().display(), schema, "initialized project");

            println!(
                "{} Initialized production tracker at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("  {} {}", style("config").dim(), project.config_path().display());
            println!("  {} {}", style("database").dim(), db_path.display());
            println!();
            println!("Next steps:");
            println!(
                "  {} Register a product",
                style("ptrack product new -p AB123 -t air-filter").yellow()
            );
            println!(
                "  {} Record a batch",
                style("ptrack batch new -i").yellow()
            );
            println!(
                "  {} Start the JSON API",
                style("ptrack serve").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reset its configuration",
                style("ptrack init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
