//! `stockpath log` command - recent ledger changes

use miette::Result;

use crate::cli::helpers::Session;
use crate::cli::output::Listing;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct LogArgs {
    /// Number of entries to show
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,
}

pub fn run(args: LogArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let entries = session.inventory().journal(args.limit)?;

    let mut listing = Listing::new(&["id", "time", "action", "type", "quantity", "from", "to"]);
    for e in &entries {
        listing.push([
            e.id.to_string(),
            e.timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            e.action.to_string(),
            e.item_type.clone().unwrap_or_default(),
            e.quantity.map(|q| q.to_string()).unwrap_or_default(),
            e.source.clone().unwrap_or_default(),
            e.destination.clone().unwrap_or_default(),
        ]);
    }
    listing.print(session.format, &entries)
}
