//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::category::Category;
use crate::core::path::{PathCodec, DEFAULT_SEPARATOR};
use crate::core::project::Project;

/// Environment variable naming the database file
pub const ENV_DATABASE: &str = "STOCKPATH_DB";

/// Environment variable naming the default category
pub const ENV_CATEGORY: &str = "STOCKPATH_CATEGORY";

/// stockpath configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file; relative paths resolve against the project root
    pub database: Option<PathBuf>,

    pub default_category: Option<Category>,

    /// Default output format
    pub default_format: Option<String>,

    /// Path separator overrides per category
    pub separators: BTreeMap<Category, char>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        // 1. Built-in defaults
        let mut config = Config::default();

        // 2. Global user config
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.stockpath/config.yaml)
        if let Some(project) = project {
            if let Some(local) = Self::read_file(&project.config_path()) {
                config.merge(local);
            }
        }

        // 4. Environment variables
        if let Ok(db) = std::env::var(ENV_DATABASE) {
            config.database = Some(PathBuf::from(db));
        }
        if let Ok(category) = std::env::var(ENV_CATEGORY) {
            match category.parse::<Category>() {
                Ok(category) => config.default_category = Some(category),
                Err(e) => warn!(variable = ENV_CATEGORY, "ignoring: {}", e),
            }
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), "cannot read config: {}", e);
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), "ignoring invalid config: {}", e);
                None
            }
        }
    }

    /// Path of the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "stockpath")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.default_category.is_some() {
            self.default_category = other.default_category;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        self.separators.extend(other.separators);
    }

    /// Path codec for a category
    pub fn codec_for(&self, category: Category) -> PathCodec {
        PathCodec::new(
            self.separators
                .get(&category)
                .copied()
                .unwrap_or(DEFAULT_SEPARATOR),
        )
    }

    /// Database file to open, if one can be determined
    pub fn database_path(&self, project: Option<&Project>) -> Option<PathBuf> {
        match (&self.database, project) {
            (Some(db), Some(project)) if db.is_relative() => Some(project.root().join(db)),
            (Some(db), _) => Some(db.clone()),
            (None, Some(project)) => Some(project.default_database()),
            (None, None) => None,
        }
    }
}
