//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::Project;

/// Default server bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Known configuration keys with descriptions
pub const KEYS: &[(&str, &str)] = &[
    ("operator", "Operator recorded as produced_by on new batches"),
    ("production_line", "Production line recorded on new batches"),
    ("bind", "Address for `ptrack serve`"),
    ("database", "Database path, relative to the project root"),
    (
        "default_format",
        "Default output format (tsv, json, yaml, etc.)",
    ),
];

/// ptrack configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default produced_by for new batches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    /// Default production line for new batches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_line: Option<String>,

    /// Server bind address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,

    /// Database path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let global = Self::global_config_path();
        let local = project.map(Project::config_path);
        Self::load_from(global.as_deref(), local.as_deref(), |name| {
            std::env::var(name).ok()
        })
    }

    /// Load from explicit files and an environment lookup
    ///
    /// Missing files are skipped. Unreadable or malformed files are logged
    /// and skipped.
    pub fn load_from(
        global: Option<&Path>,
        project: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Config::default();

        for path in [global, project].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path) {
                config.merge(layer);
            }
        }

        let from_env = Config {
            operator: env("PTRACK_OPERATOR"),
            production_line: env("PTRACK_LINE"),
            bind: env("PTRACK_BIND"),
            database: env("PTRACK_DATABASE"),
            default_format: None,
        };
        config.merge(from_env);

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };
        if contents.trim().is_empty() {
            return None;
        }
        match serde_yml::from_str::<Option<Config>>(&contents) {
            Ok(layer) => layer,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ptrack")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.operator.is_some() {
            self.operator = other.operator;
        }
        if other.production_line.is_some() {
            self.production_line = other.production_line;
        }
        if other.bind.is_some() {
            self.bind = other.bind;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
    }

    /// Look up a key by name
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "operator" => self.operator.as_deref(),
            "production_line" => self.production_line.as_deref(),
            "bind" => self.bind.as_deref(),
            "database" => self.database.as_deref(),
            "default_format" => self.default_format.as_deref(),
            _ => None,
        }
    }

    /// Whether a key name is recognized
    pub fn is_known_key(key: &str) -> bool {
        KEYS.iter().any(|(k, _)| *k == key)
    }

    /// Server bind address
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    /// Database file for a project
    pub fn database_path(&self, project: &Project) -> PathBuf {
        project.database_path(self.database.as_deref())
    }
}
