//! `stockpath init` command - create a project and its database

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError};
use crate::core::{Config, Database};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Rewrite the config even if .stockpath/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    let project = match project {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} stockpath project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("stockpath init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let config = Config::load_for(Some(&project));
    let db_path = match &global.db {
        Some(db) => db.clone(),
        None => config
            .database_path(Some(&project))
            .unwrap_or_else(|| project.default_database()),
    };
    Database::open(&db_path)?;

    if !global.quiet {
        println!(
            "{} Initialized stockpath project at {}",
            style("✓").green(),
            style(project.root().display()).cyan()
        );
        println!("  {} {}", style("config").dim(), project.config_path().display());
        println!("  {} {}", style("database").dim(), db_path.display());
        println!();
        println!("Next steps:");
        println!(
            "  {} Stock your first items",
            style("stockpath -c cables item add \"USB-C Cable\" 5 --at Lab/Bench3").yellow()
        );
        println!(
            "  {} See where everything is",
            style("stockpath -c cables loc tree").yellow()
        );
    }
    Ok(())
}
