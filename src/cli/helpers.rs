//! Shared helper functions for CLI commands

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::cli::OutputFormat;
use crate::core::{Category, Config, Database, Inventory, Project};

/// Everything a ledger command needs: the resolved project, config,
/// database and category
pub struct Session {
    pub project: Option<Project>,
    pub config: Config,
    pub db: Database,
    pub category: Category,
    pub format: OutputFormat,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = find_project(global)?;
        let config = Config::load_for(project.as_ref());

        let db_path = resolve_database(global, &config, project.as_ref())?;
        debug!(path = %db_path.display(), "opening database");
        let db = Database::open(&db_path)?;

        let category = global
            .category
            .or(config.default_category)
            .ok_or_else(|| {
                miette::miette!(
                    help = "Pass --category, or set default_category in .stockpath/config.yaml",
                    "no category selected"
                )
            })?;

        let format = resolve_format(global.format, &config);
        Ok(Self {
            project,
            config,
            db,
            category,
            format,
        })
    }

    pub fn inventory(&self) -> Inventory<'_> {
        Inventory::new(&self.db, self.category, self.config.codec_for(self.category))
    }
}

/// `--project` if given, else whatever is found walking up from the
/// current directory
pub fn find_project(global: &GlobalOpts) -> Result<Option<Project>> {
    match &global.project {
        Some(root) => Project::discover_from(root)
            .map(Some)
            .map_err(|e| miette::miette!("{}", e)),
        None => Ok(Project::discover().ok()),
    }
}

fn resolve_database(global: &GlobalOpts, config: &Config, project: Option<&Project>) -> Result<PathBuf> {
    if let Some(db) = &global.db {
        return Ok(db.clone());
    }
    config.database_path(project).ok_or_else(|| {
        miette::miette!(
            help = "Run 'stockpath init' or pass --db <FILE>",
            "not a stockpath project and no database given"
        )
    })
}

/// An explicit `--format` wins; `auto` defers to `default_format`
fn resolve_format(format: OutputFormat, config: &Config) -> OutputFormat {
    use clap::ValueEnum;

    if format != OutputFormat::Auto {
        return format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|f| OutputFormat::from_str(f, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Ask before a destructive command. Skipped with `--yes` or when stdin is
/// not a terminal.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Print a success line unless `--quiet`
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// "1 location", "3 locations"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}
