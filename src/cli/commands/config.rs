//! `stockpath config` command - configuration inspection

use clap::Subcommand;
use console::style;
use miette::Result;
use std::path::Path;

use crate::cli::helpers::find_project;
use crate::cli::GlobalOpts;
use crate::core::config::{ENV_CATEGORY, ENV_DATABASE};
use crate::core::{Category, Config};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show(ShowArgs),

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

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("database", "SQLite file, relative to the project root"),
    ("default_category", "Category used when --category is omitted"),
    ("default_format", "Default output format (tsv, json, csv, md, id)"),
    ("separators", "Path separator per category, e.g. separators.adapters"),
];

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    let project = find_project(global)?;
    let config = Config::load_for(project.as_ref());

    match cmd {
        ConfigCommands::Show(args) => run_show(&config, args),
        ConfigCommands::Path => {
            run_path(project.as_ref().map(|p| p.config_path()).as_deref())
        }
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(config: &Config, args: ShowArgs) -> Result<()> {
    if let Some(key) = &args.key {
        return match get_config_value(config, key) {
            Some(value) => {
                println!("{}", value);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS.iter().filter(|(k, _)| *k != "separators") {
        print_config_value(key, get_config_value(config, key).as_deref());
    }
    for category in Category::ALL {
        let key = format!("separators.{}", category);
        let sep = config.codec_for(category).separator().to_string();
        print_config_value(&key, Some(&sep));
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Environment variables ({}, {})", ENV_DATABASE, ENV_CATEGORY);
    println!("  2. Project config (.stockpath/config.yaml)");
    println!("  3. Global config ({})", global_path_display());
    Ok(())
}

fn run_path(project_path: Option<&Path>) -> Result<()> {
    let global_path = Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))?;

    println!("{}", style("Configuration file paths:").bold());
    println!();
    print_path("Global:", &global_path);
    match project_path {
        Some(path) => print_path("Project:", path),
        None => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a stockpath project)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();
    for (key, description) in VALID_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }
    Ok(())
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "database" => config.database.as_ref().map(|p| p.display().to_string()),
        "default_category" => config.default_category.map(|c| c.to_string()),
        "default_format" => config.default_format.clone(),
        "separators" => serde_yml::to_string(&config.separators)
            .ok()
            .filter(|_| !config.separators.is_empty()),
        other => {
            let category = other.strip_prefix("separators.")?.parse::<Category>().ok()?;
            Some(config.codec_for(category).separator().to_string())
        }
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn print_path(label: &str, path: &Path) {
    let state = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {} {} {}", style(label).cyan(), path.display(), state);
}

fn global_path_display() -> String {
    Config::global_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "unavailable".to_string())
}
