//! `stockpath item` command - stock queries and commands

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{plural, success, Session};
use crate::cli::output::{self, Listing};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Inventory, ItemId, ItemRecord, LedgerError, StockLine, UNASSIGNED};

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Add stock of an item type at a location, creating the location if needed
    Add(AddArgs),

    /// Remove stock from an item row
    Remove(RemoveArgs),

    /// Move stock from an item row to another location
    Move(MoveArgs),

    /// List item rows at exactly one location
    List(LocationArgs),

    /// Total per item type at a location and everything below it
    Summary(LocationArgs),

    /// Find every row of an item type (case-insensitive)
    Find(FindArgs),

    /// List every item row in the category
    Stock,

    /// Show one item row
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Item type, e.g. "USB-C Cable"
    pub item_type: String,

    /// Quantity to add
    pub count: i64,

    /// Location
    #[arg(long, short = 'a', default_value = UNASSIGNED)]
    pub at: String,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    pub id: ItemId,

    /// Quantity to remove
    pub count: i64,
}

#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    pub id: ItemId,

    /// Destination location (must exist)
    pub destination: String,

    /// Quantity to move (default: all of it)
    #[arg(long, short = 'n')]
    pub count: Option<i64>,
}

#[derive(clap::Args, Debug)]
pub struct LocationArgs {
    pub location: String,
}

#[derive(clap::Args, Debug)]
pub struct FindArgs {
    pub item_type: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    pub id: ItemId,
}

pub fn run(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let inventory = session.inventory();
    let format = session.format;

    match cmd {
        ItemCommands::Add(args) => run_add(&inventory, args, global),
        ItemCommands::Remove(args) => run_remove(&inventory, args, global),
        ItemCommands::Move(args) => run_move(&inventory, args, global),
        ItemCommands::List(args) => print_records(&inventory.records_at(&args.location)?, format),
        ItemCommands::Summary(args) => print_lines(&inventory.summarize(&args.location)?, format),
        ItemCommands::Find(args) => print_records(&inventory.find_by_type(&args.item_type)?, format),
        ItemCommands::Stock => print_records(&inventory.stock()?, format),
        ItemCommands::Show(args) => {
            let record = inventory
                .item(args.id)?
                .ok_or(LedgerError::ItemNotFound(args.id))?;
            print_records(&[record], format)
        }
    }
}

fn run_add(inventory: &Inventory<'_>, args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let id = inventory.add_item(&args.item_type, args.count, &args.at)?;
    if global.quiet {
        return Ok(());
    }
    if let Some(record) = inventory.item(id)? {
        success(
            global,
            format!(
                "Added {} {} at {} {}",
                style(args.count).yellow(),
                record.item_type,
                style(&record.location).cyan(),
                style(format!("(#{} now {})", record.id, record.quantity)).dim()
            ),
        );
    }
    Ok(())
}

fn run_remove(inventory: &Inventory<'_>, args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let record = inventory.remove_item(args.id, args.count)?;
    success(
        global,
        format!(
            "Removed {} {} from {} ({} left)",
            style(args.count).yellow(),
            record.item_type,
            style(&record.location).cyan(),
            record.quantity
        ),
    );
    Ok(())
}

fn run_move(inventory: &Inventory<'_>, args: MoveArgs, global: &GlobalOpts) -> Result<()> {
    let source = inventory
        .item(args.id)?
        .ok_or(LedgerError::ItemNotFound(args.id))?;
    let destination = inventory.parse_location(&args.destination)?;
    if destination == source.location {
        return Err(LedgerError::SameLocation(args.id, destination).into());
    }

    let count = args.count.unwrap_or(source.quantity);
    let outcome = inventory.move_item(args.id, &destination, count)?;
    success(
        global,
        format!(
            "Moved {} {} {} {} {} {}",
            style(count).yellow(),
            outcome.item_type,
            style(&outcome.source).cyan(),
            style("→").dim(),
            style(&outcome.destination).cyan(),
            style(format!("(#{} now {})", outcome.destination_id, outcome.destination_quantity)).dim()
        ),
    );
    Ok(())
}

fn print_records(records: &[ItemRecord], format: OutputFormat) -> Result<()> {
    let mut listing = Listing::new(&["id", "type", "quantity", "location"]);
    for r in records {
        listing.push([
            r.id.to_string(),
            r.item_type.clone(),
            r.quantity.to_string(),
            r.location.clone(),
        ]);
    }
    listing.print(format, &records)?;
    if output::resolve(format) == OutputFormat::Auto {
        eprintln!("{}", style(plural(records.len(), "row")).dim());
    }
    Ok(())
}

fn print_lines(lines: &[StockLine], format: OutputFormat) -> Result<()> {
    let mut listing = Listing::new(&["type", "quantity"]);
    for line in lines {
        listing.push([line.item_type.clone(), line.quantity.to_string()]);
    }
    listing.print(format, &lines)
}
