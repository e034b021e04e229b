use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;

use stake_indexer::application::sync::{NetworkManager, SyncMode, SyncReport};
use stake_indexer::config::{AppConfig, Network};
use stake_indexer::infrastructure::persistence::{DbPool, RepositoryFactory};
use stake_indexer::infrastructure::subgraph::SubgraphClient;
use stake_indexer::infrastructure::web;
use stake_indexer::utils::{logging, CancelSignal};

/// Stake indexer: syncs active stakes from the per-network subgraphs into Postgres
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Command to execute (defaults to `serve`)
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduled sync loop and the admin API
    Serve,
    /// Refetch everything and replace the stored snapshot
    Resync {
        /// Only this network (all enabled networks if not specified)
        #[arg(short, long)]
        network: Option<Network>,
    },
    /// Apply events newer than the stored cursor
    Sync {
        /// Only this network (all enabled networks if not specified)
        #[arg(short, long)]
        network: Option<Network>,
    },
    /// Print the stored sync status
    Status {
        /// Only this network (all networks if not specified)
        #[arg(short, long)]
        network: Option<Network>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init_logger();
    let cli = Cli::parse();

    match run(cli.command.unwrap_or(Commands::Serve)).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            logging::log_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every requested run succeeded
async fn run(command: Commands) -> anyhow::Result<bool> {
    let config = AppConfig::from_env();
    logging::log_info(&format!(
        "Stake indexer v{}, networks enabled: {:?}",
        env!("CARGO_PKG_VERSION"),
        config.enabled_networks()
    ));

    let db_pool = DbPool::new(&config)
        .await
        .context("database connection failed")?;
    let repositories = RepositoryFactory::create_repositories(&db_pool);
    let source = SubgraphClient::new(&config).context("could not build subgraph client")?;

    let cancel = CancelSignal::new();
    let signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logging::log_warning("Ctrl+C received, stopping after in-flight work");
            signal.cancel();
        }
    });

    let manager = Arc::new(NetworkManager::from_repositories(
        config.clone(),
        Arc::new(source),
        repositories,
        cancel.clone(),
    ));

    match command {
        Commands::Serve => {
            let scheduler = {
                let manager = manager.clone();
                tokio::spawn(async move { manager.run_scheduled().await })
            };

            web::start_server(&config, manager, cancel.clone())
                .await
                .context("admin API stopped with an error")?;

            // The server returns once cancelled; let the scheduler finish its current tick
            cancel.cancel();
            scheduler.await.context("scheduler task panicked")?;
            Ok(true)
        }
        Commands::Resync { network } => run_once(&manager, network, SyncMode::Full).await,
        Commands::Sync { network } => run_once(&manager, network, SyncMode::Incremental).await,
        Commands::Status { network } => {
            let statuses = manager.status(network).await?;
            print_json(&statuses)?;
            Ok(true)
        }
    }
}

async fn run_once(
    manager: &NetworkManager,
    network: Option<Network>,
    mode: SyncMode,
) -> anyhow::Result<bool> {
    let reports: Vec<SyncReport> = match network {
        Some(network) => vec![manager.run_sync(network, mode).await],
        None => manager.sync_all(mode).await,
    };

    print_json(&reports)?;

    for report in reports.iter().filter(|r| r.has_partial_failures()) {
        logging::log_warning(&format!(
            "[{}] ⚠️ {} chunks were not written, the next sync fetches them again",
            report.network,
            report.failed_chunks.len()
        ));
    }

    Ok(reports.iter().all(|r| r.success))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
