//! Shared utilities for CLI commands

use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::project::Project;
use crate::core::store::Store;
use crate::core::Config;

/// An opened project with its merged config and record store
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub store: Store,
}

/// Locate the project from `--project` or the current directory
pub fn discover_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Open the project, its config and its database
pub fn open_workspace(global: &GlobalOpts) -> Result<Workspace> {
    let project = discover_project(global)?;
    let config = Config::load(Some(&project));
    let db_path = config.database_path(&project);
    tracing::debug!(path = %db_path.display(), "opening store");
    let store = Store::open(&db_path).into_diagnostic()?;
    Ok(Workspace {
        project,
        config,
        store,
    })
}

/// Print a value as JSON or YAML
///
/// Returns `false` for any other format so the caller renders it instead.
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Trim a prompt answer, mapping blank to `None`
pub fn non_empty(answer: String) -> Option<String> {
    let trimmed = answer.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
