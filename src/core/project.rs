//! Project discovery and structure
//!
//! A project is any directory containing a `.ptrack/` folder. The folder
//! holds `config.yaml` and, by default, the SQLite database.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-project directory
pub const PROJECT_DIR: &str = ".ptrack";

/// Default database file name inside the project directory
pub const DATABASE_FILE: &str = "ptrack.db";

/// Represents a ptrack project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .ptrack/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(format!("{}: {}", start.display(), e)))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = Self::resolve_root(path)?;
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::write_structure(root)
    }

    /// Initialize even if .ptrack/ exists, resetting config.yaml
    ///
    /// An existing database is left in place.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = Self::resolve_root(path)?;
        Self::write_structure(root)
    }

    fn resolve_root(path: &Path) -> Result<PathBuf, ProjectError> {
        std::fs::create_dir_all(path).map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()))
    }

    fn write_structure(root: PathBuf) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.ptrack_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# Production tracker project configuration

# Operator recorded as produced_by on new batches
# operator: ""

# Production line recorded on new batches
# production_line: ""

# Address for `ptrack serve`
# bind: "127.0.0.1:8080"

# Database path, relative to the project root
# database: ".ptrack/ptrack.db"

# Default output format (auto, tsv, json, yaml, csv, md, id)
# default_format: auto
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .ptrack directory
    pub fn ptrack_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Path of the project config file
    pub fn config_path(&self) -> PathBuf {
        self.ptrack_dir().join("config.yaml")
    }

    /// Resolve a database setting against the project root
    ///
    /// Relative paths are taken from the root; `None` selects the default
    /// `.ptrack/ptrack.db`.
    pub fn database_path(&self, configured: Option<&str>) -> PathBuf {
        match configured.map(str::trim).filter(|s| !s.is_empty()) {
            Some(p) if Path::new(p).is_absolute() => PathBuf::from(p),
            Some(p) => self.root.join(p),
            None => self.ptrack_dir().join(DATABASE_FILE),
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a ptrack project (searched from {searched_from:?}). Run 'ptrack init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("ptrack project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.ptrack_dir().is_dir());
        assert!(project.config_path().exists());
    }

    #[test]
    fn test_project_init_creates_missing_directory() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("plant/line-a");
        let project = Project::init(&target).unwrap();
        assert!(project.config_path().exists());
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_init_force_resets_config() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.config_path(), "operator: someone\n").unwrap();

        let project = Project::init_force(tmp.path()).unwrap();
        let contents = std::fs::read_to_string(project.config_path()).unwrap();
        assert!(!contents.contains("someone"));
    }

    #[test]
    fn test_project_discover_finds_ptrack_dir() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_ptrack_dir() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_database_path_resolution() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert_eq!(
            project.database_path(None),
            project.ptrack_dir().join("ptrack.db")
        );
        assert_eq!(
            project.database_path(Some("data/line.db")),
            project.root().join("data/line.db")
        );
        let abs = tmp.path().join("elsewhere.db");
        assert_eq!(project.database_path(abs.to_str()), abs);
    }
}
