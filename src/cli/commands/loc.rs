//! `stockpath loc` command - location queries and commands

use std::collections::HashMap;

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{confirm, plural, success, Session};
use crate::cli::output::Listing;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Inventory, LedgerError};

#[derive(Subcommand, Debug)]
pub enum LocCommands {
    /// List every location with item totals
    List,

    /// Show the location hierarchy as a tree
    Tree(TreeArgs),

    /// List the direct children of a location (top level if omitted)
    Children(ChildrenArgs),

    /// Create a location; its parent must already exist
    New(NewArgs),

    /// Delete a location and its descendants, moving their items up
    Delete(DeleteArgs),

    /// Check whether a location exists
    Exists(ExistsArgs),
}

#[derive(clap::Args, Debug)]
pub struct TreeArgs {
    /// Hide item totals
    #[arg(long)]
    pub bare: bool,
}

#[derive(clap::Args, Debug)]
pub struct ChildrenArgs {
    /// Parent location
    pub parent: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Full path, or just the name when --parent is given
    pub path: String,

    /// Create the location below this parent
    #[arg(long, short = 'p')]
    pub parent: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    pub path: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExistsArgs {
    pub path: String,
}

#[derive(Serialize)]
struct LocationRow {
    location: String,
    here: i64,
    total: i64,
}

pub fn run(cmd: LocCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let inventory = session.inventory();

    match cmd {
        LocCommands::List => run_list(&inventory, session.format),
        LocCommands::Tree(args) => run_tree(&inventory, args),
        LocCommands::Children(args) => run_children(&inventory, args, session.format),
        LocCommands::New(args) => run_new(&inventory, args, global),
        LocCommands::Delete(args) => run_delete(&inventory, args, global),
        LocCommands::Exists(args) => run_exists(&inventory, args),
    }
}

fn run_list(inventory: &Inventory<'_>, format: OutputFormat) -> Result<()> {
    let mut rows = Vec::new();
    for location in inventory.list_locations()? {
        let here = inventory
            .by_location(&location)?
            .iter()
            .map(|line| line.quantity)
            .sum::<i64>();
        let total = inventory.total(&location)?;
        rows.push(LocationRow {
            location,
            here,
            total,
        });
    }

    let mut listing = Listing::new(&["location", "here", "total"]);
    for row in &rows {
        listing.push([row.location.clone(), row.here.to_string(), row.total.to_string()]);
    }
    listing.print(format, &rows)
}

fn run_tree(inventory: &Inventory<'_>, args: TreeArgs) -> Result<()> {
    let tree = inventory.tree()?;
    let mut totals = HashMap::new();
    if !args.bare {
        for path in tree.paths() {
            let total = inventory.total(&path)?;
            totals.insert(path, total);
        }
    }

    let rendered = tree.render(|node| {
        totals
            .get(&node.path)
            .filter(|total| **total > 0)
            .map(|total| total.to_string())
    });
    print!("{}", rendered);
    Ok(())
}

fn run_children(inventory: &Inventory<'_>, args: ChildrenArgs, format: OutputFormat) -> Result<()> {
    let children: Vec<String> = inventory
        .child_segments(args.parent.as_deref())?
        .into_iter()
        .collect();

    let mut listing = Listing::new(&["name"]);
    for name in &children {
        listing.push([name]);
    }
    listing.print(format, &children)
}

fn run_new(inventory: &Inventory<'_>, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let path = match args.parent.as_deref() {
        Some(parent) => inventory.create_location(Some(parent), &args.path)?,
        None => inventory.create_location_path(&args.path)?,
    };
    success(
        global,
        format!(
            "Created {} location {}",
            inventory.category(),
            style(&path).cyan()
        ),
    );
    Ok(())
}

fn run_delete(inventory: &Inventory<'_>, args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let path = inventory.parse_location(&args.path)?;
    let prompt = format!(
        "Delete '{}' and everything below it? Items move to the parent location",
        path
    );
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let report = inventory.delete_location(&path)?;
    if global.quiet {
        return Ok(());
    }
    success(
        global,
        format!(
            "Deleted {} ({})",
            style(&report.location).cyan(),
            plural(report.locations_removed, "location")
        ),
    );
    for line in &report.merged {
        println!(
            "  {} {} {} {}",
            style(line.quantity).yellow(),
            line.item_type,
            style("→").dim(),
            style(&report.destination).cyan()
        );
    }
    Ok(())
}

fn run_exists(inventory: &Inventory<'_>, args: ExistsArgs) -> Result<()> {
    if inventory.exists(&args.path)? {
        println!("true");
        Ok(())
    } else {
        println!("false");
        Err(LedgerError::LocationNotFound(inventory.parse_location(&args.path)?).into())
    }
}
