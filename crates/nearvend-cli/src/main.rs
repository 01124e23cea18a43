mod locate;
mod recent;
mod search;
mod status;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nearvend")]
#[command(about = "Vendor discovery from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve, set, or clear the search location
    Locate {
        #[command(subcommand)]
        command: Option<locate::LocateCommands>,
    },
    /// Search vendors near the resolved location
    Search {
        /// Filter by category; repeat for several
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Sort order (defaults to distance when a location is known)
        #[arg(long)]
        sort: Option<String>,
        /// Search this city instead of the resolved location
        #[arg(long)]
        city: Option<String>,
        /// Widen the search this many radius levels after the initial load
        #[arg(long, default_value = "0")]
        expand: usize,
        /// Mark result N (as numbered in the output) as viewed
        #[arg(long)]
        open: Option<usize>,
        /// Skip the online-status lookup
        #[arg(long)]
        skip_status: bool,
    },
    /// Check vendor online status by profile id
    Status {
        /// Vendor profile ids
        #[arg(required = true)]
        ids: Vec<String>,
        /// Keep polling and reprint on each tick
        #[arg(long)]
        watch: bool,
    },
    /// Show recently viewed vendors
    Recent {
        /// Clear the list
        #[arg(long)]
        clear: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = nearvend_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Locate { command }) => locate::run_locate(&config, command).await?,
        Some(Commands::Search {
            categories,
            sort,
            city,
            expand,
            open,
            skip_status,
        }) => {
            search::run_search(&config, categories, sort, city, expand, open, skip_status).await?;
        }
        Some(Commands::Status { ids, watch }) => status::run_status(&config, &ids, watch).await?,
        Some(Commands::Recent { clear }) => recent::run_recent(&config, clear)?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}
