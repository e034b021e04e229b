use clap::{Parser, Subcommand};
use std::error::Error;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod migration;

/// Schema tool for the stake indexer's Postgres store
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the stake database if it does not exist
    Create {
        /// Database name (defaults to the one in DATABASE_URL)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Apply pending migrations
    Migrate {
        /// Apply at most this many
        #[arg(short, long)]
        steps: Option<u32>,
    },
    /// Drop every table and migrate from scratch; stored stakes are lost
    Reset {
        /// Required, since the next sync has to rebuild every network
        #[arg(long)]
        yes: bool,
    },
    /// List applied and pending migrations
    Status,
    /// Insert missing sync_status rows
    Seed {
        /// Only this network (ethereum or pulsechain)
        #[arg(short, long)]
        network: Option<String>,
        /// Also clear a sync_in_progress flag left by a crashed indexer
        #[arg(long)]
        clear_in_progress: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Commands::Create { name } => commands::create::execute(name).await,
        Commands::Migrate { steps } => commands::migrate::execute(steps).await,
        Commands::Reset { yes: false } => {
            Err("reset drops all stake data; pass --yes to confirm".into())
        }
        Commands::Reset { yes: true } => commands::migrate::reset().await,
        Commands::Status => commands::migrate::status().await,
        Commands::Seed {
            network,
            clear_in_progress,
        } => commands::seed::execute(network, clear_in_progress).await,
    }
}
