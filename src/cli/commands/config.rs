//! `ptrack config` command - Configuration management

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::commands::utils::discover_project;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::KEYS;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

    /// Print a single effective value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Remove a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `ptrack config keys`)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Get(args) => run_show(ShowArgs { key: Some(args.key) }, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global).ok();
    let config = Config::load(project.as_ref());

    if let Some(key) = &args.key {
        check_key(key)?;
        return match config.get(key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in KEYS {
        match config.get(key) {
            Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
            None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
        }
    }

    println!();
    println!("{}", style("Config sources (in priority order):").dim());
    println!("  1. Environment (PTRACK_OPERATOR, PTRACK_LINE, PTRACK_BIND, PTRACK_DATABASE)");
    println!("  2. Project config (.ptrack/config.yaml)");
    println!("  3. Global config");
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    if args.key == "default_format" && OutputFormat::from_str(&args.value, true).is_err() {
        return Err(miette::miette!(
            help = "one of: auto, tsv, json, yaml, csv, md, id",
            "Unknown output format '{}'",
            args.value
        ));
    }

    let path = target_path(args.global, global)?;
    let mut map = read_mapping(&path)?;
    map.insert(
        serde_yml::Value::String(args.key.clone()),
        serde_yml::Value::String(args.value.clone()),
    );
    write_mapping(&path, map)?;

    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow(),
        scope(args.global)
    );
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    check_key(&args.key)?;
    let path = target_path(args.global, global)?;
    if !path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            path.display()
        ));
    }

    let mut map = read_mapping(&path)?;
    if map
        .remove(&serde_yml::Value::String(args.key.clone()))
        .is_none()
    {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    write_mapping(&path, map)?;

    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope(args.global)
    );
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    println!("{}", style("Configuration file paths:").bold());
    println!();

    match Config::global_config_path() {
        Some(path) => print_path("Global:", &path),
        None => println!("  {} {}", style("Global:").cyan(), style("(unavailable)").dim()),
    }
    println!();
    match discover_project(global) {
        Ok(project) => print_path("Project:", &project.config_path()),
        Err(_) => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a ptrack project)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in KEYS {
        println!("  {:<18} {}", style(key).cyan(), style(description).dim());
    }
    println!();
    println!(
        "{}",
        style("Use 'ptrack config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn check_key(key: &str) -> Result<()> {
    if Config::is_known_key(key) {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "run `ptrack config keys` to list valid keys",
            "Unknown configuration key '{}'",
            key
        ))
    }
}

fn scope(global: bool) -> &'static str {
    if global {
        "global"
    } else {
        "project"
    }
}

fn target_path(use_global: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if use_global {
        Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine global config directory"))
    } else {
        Ok(discover_project(global)?.config_path())
    }
}

fn print_path(label: &str, path: &Path) {
    println!("  {} {}", style(label).cyan(), path.display());
    if path.exists() {
        println!("    {}", style("(exists)").green());
    } else {
        println!("    {}", style("(not created)").dim());
    }
}

/// Read a config file as a YAML mapping; missing or empty files give an empty one
fn read_mapping(path: &Path) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let has_entries = content.lines().any(|l| {
        let l = l.trim();
        !l.is_empty() && !l.starts_with('#')
    });
    if !has_entries {
        return Ok(serde_yml::Mapping::new());
    }
    match serde_yml::from_str::<serde_yml::Value>(&content).into_diagnostic()? {
        serde_yml::Value::Mapping(map) => Ok(map),
        serde_yml::Value::Null => Ok(serde_yml::Mapping::new()),
        _ => Err(miette::miette!(
            "Config file is not a key/value mapping: {}",
            path.display()
        )),
    }
}

fn write_mapping(path: &Path, map: serde_yml::Mapping) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&serde_yml::Value::Mapping(map)).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_mapping_missing_and_comment_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(read_mapping(&path).unwrap().is_empty());

        fs::write(&path, "# operator: \"\"\n").unwrap();
        assert!(read_mapping(&path).unwrap().is_empty());
    }

    #[test]
    fn test_write_then_load_as_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut map = serde_yml::Mapping::new();
        map.insert(
            serde_yml::Value::String("operator".into()),
            serde_yml::Value::String("Dana".into()),
        );
        write_mapping(&path, map).unwrap();

        let config = Config::load_from(None, Some(path.as_path()), |_| None);
        assert_eq!(config.operator.as_deref(), Some("Dana"));
    }

    #[test]
    fn test_rejects_non_mapping() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "- a\n- b\n").unwrap();
        assert!(read_mapping(&path).is_err());
    }

    #[test]
    fn test_check_key() {
        assert!(check_key("operator").is_ok());
        assert!(check_key("author").is_err());
    }
}
