//! Project discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory holding config and database
pub const PROJECT_DIR: &str = ".stockpath";

/// Default database file inside the marker directory
pub const DATABASE_FILE: &str = "inventory.db";

/// A stockpath project: any directory containing `.stockpath/`
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Find the project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the project root by walking up from `start`
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

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

    /// Create `.stockpath/` with a default config under `path`
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::scaffold(root)
    }

    /// Like [`Project::init`], but rewrites the config of an existing
    /// project. The database is left alone.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::scaffold(root)
    }

    fn scaffold(root: PathBuf) -> Result<Self, ProjectError> {
        let dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# stockpath project configuration

# SQLite database, relative to the project root
# database: .stockpath/inventory.db

# Category used when --category is not given
# (accessories, adapters, cables, chargers)
# default_category: cables

# Default output format (auto, tsv, json, csv, md, id)
# default_format: auto

# Path separator per category (default '/')
# separators:
#   adapters: ">"
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.stockpath` directory
    pub fn dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir().join("config.yaml")
    }

    /// Database location when the config does not name one
    pub fn default_database(&self) -> PathBuf {
        self.dir().join(DATABASE_FILE)
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a stockpath project (searched from {searched_from:?}). Run 'stockpath init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("stockpath project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_marker_and_config() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        assert!(project.dir().is_dir());
        assert!(project.config_path().exists());
        assert_eq!(project.default_database(), project.dir().join("inventory.db"));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let err = Project::init(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
        Project::init_force(tmp.path()).unwrap();
    }

    #[test]
    fn test_discover_walks_up() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path()).unwrap();

        let nested = tmp.path().join("shelf/a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }
}
