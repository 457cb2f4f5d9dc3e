use clap::Parser;
use miette::Result;
use stockpath::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` exits quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => stockpath::cli::commands::init::run(args, &global),
        Commands::Loc(cmd) => stockpath::cli::commands::loc::run(cmd, &global),
        Commands::Item(cmd) => stockpath::cli::commands::item::run(cmd, &global),
        Commands::Log(args) => stockpath::cli::commands::log::run(args, &global),
        Commands::Config(cmd) => stockpath::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => stockpath::cli::commands::completions::run(args),
    }
}

/// Log to stderr. `--verbose` forces debug; otherwise `STOCKPATH_LOG`, then
/// `RUST_LOG`, then warn.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("STOCKPATH_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
