//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, init::InitArgs, item::ItemCommands,
    loc::LocCommands, log::LogArgs,
};
use crate::core::Category;

#[derive(Parser)]
#[command(name = "stockpath")]
#[command(author, version, about = "Hierarchical location inventory")]
#[command(long_about = "Track how many of each item type sit where, in a tree of locations per category, stored in a local SQLite file.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Item category (default: `default_category` from config)
    #[arg(long, short = 'c', global = true, value_enum)]
    pub category: Option<Category>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .stockpath/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Database file, overriding the project and config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new stockpath project
    Init(InitArgs),

    /// Location queries and commands
    #[command(subcommand)]
    Loc(LocCommands),

    /// Item queries and commands
    #[command(subcommand)]
    Item(ItemCommands),

    /// Show recent ledger changes
    Log(LogArgs),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table on a terminal, tsv when piped
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just the first column, one per line
    Id,
}
