use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};

use crate::application::sync::orchestrator::SyncOrchestrator;
use crate::application::sync::report::SyncReport;
use crate::application::sync::state::SyncMode;
use crate::config::{AppConfig, Network};
use crate::domain::errors::SyncError;
use crate::domain::models::SyncStatus;
use crate::domain::ports::{StakeEventSource, SyncStatusStore};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::Repositories;
use crate::utils::cancel::CancelSignal;
use crate::utils::logging;

/// Manager for the per-network sync runs
///
/// Owns one lock per network so a process never runs two syncs of the same network at
/// once. A request for a network that is already syncing is turned away, not queued.
pub struct NetworkManager {
    config: AppConfig,
    orchestrator: Arc<SyncOrchestrator>,
    status_store: Arc<dyn SyncStatusStore>,
    locks: HashMap<Network, Arc<Mutex<()>>>,
    cancel: CancelSignal,
}

impl NetworkManager {
    /// Creates a new network manager instance
    pub fn new(
        config: AppConfig,
        orchestrator: Arc<SyncOrchestrator>,
        status_store: Arc<dyn SyncStatusStore>,
        cancel: CancelSignal,
    ) -> Self {
        let locks = Network::ALL
            .iter()
            .map(|network| (*network, Arc::new(Mutex::new(()))))
            .collect();

        Self {
            config,
            orchestrator,
            status_store,
            locks,
            cancel,
        }
    }

    /// Wire the manager to the database repositories and a stake event source
    pub fn from_repositories(
        config: AppConfig,
        source: Arc<dyn StakeEventSource>,
        repositories: Repositories,
        cancel: CancelSignal,
    ) -> Self {
        let status_store: Arc<dyn SyncStatusStore> = Arc::new(repositories.sync_status);
        let orchestrator = SyncOrchestrator::new(
            source,
            Arc::new(repositories.stake),
            Arc::new(repositories.global_info),
            status_store.clone(),
            config.sync.clone(),
        );

        Self::new(config, Arc::new(orchestrator), status_store, cancel)
    }

    pub fn enabled_networks(&self) -> Vec<Network> {
        self.config.enabled_networks()
    }

    pub fn cancel_signal(&self) -> &CancelSignal {
        &self.cancel
    }

    /// Run one sync for a network, unless it is disabled or already running here
    pub async fn run_sync(&self, network: Network, mode: SyncMode) -> SyncReport {
        if !self.enabled_networks().contains(&network) {
            return SyncReport::rejected(network, mode, &SyncError::NetworkDisabled(network));
        }

        let Some(lock) = self.locks.get(&network) else {
            return SyncReport::rejected(network, mode, &SyncError::NetworkDisabled(network));
        };

        let _guard = match lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                logging::log_warning(&format!(
                    "[{}] ⏳ Sync already running, rejecting {} request",
                    network, mode
                ));
                return SyncReport::rejected(network, mode, &SyncError::AlreadyRunning(network));
            }
        };

        self.orchestrator.run(network, mode, &self.cancel).await
    }

    /// Run the same sync on every enabled network concurrently
    pub async fn sync_all(&self, mode: SyncMode) -> Vec<SyncReport> {
        let networks = self.enabled_networks();
        if networks.is_empty() {
            logging::log_warning("No networks enabled, nothing to sync");
        }

        join_all(
            networks
                .into_iter()
                .map(|network| self.run_sync(network, mode)),
        )
        .await
    }

    /// Stored status of one network, or of every supported network
    pub async fn status(&self, network: Option<Network>) -> Result<Vec<SyncStatus>, DbError> {
        let stored = match network {
            Some(network) => self.status_store.get_status(network).await?.into_iter().collect(),
            None => self.status_store.list_statuses().await?,
        };

        let wanted: Vec<Network> = match network {
            Some(network) => vec![network],
            None => Network::ALL.to_vec(),
        };

        Ok(wanted
            .into_iter()
            .map(|network| {
                stored
                    .iter()
                    .find(|s: &&SyncStatus| s.network == network)
                    .cloned()
                    .unwrap_or_else(|| SyncStatus::never_synced(network))
            })
            .collect())
    }

    /// Periodic sync loop, returning once cancellation is requested
    pub async fn run_scheduled(&self) {
        let mut ticker = interval(self.config.sync.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;

        logging::log_info(&format!(
            "🕒 Scheduled sync every {}s, full resync every {} ticks",
            self.config.sync.interval_secs, self.config.sync.full_resync_every
        ));

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.cancel.cancelled() => break,
            }

            // ticks count from 1, so the first run after start-up is incremental
            tick += 1;
            let mode = mode_for_tick(tick, self.config.sync.full_resync_every);
            let reports = self.sync_all(mode).await;

            for report in &reports {
                if report.success {
                    logging::log_info(&format!(
                        "[{}] Scheduled {} sync done: {} written, {} stored",
                        report.network, report.mode, report.inserted_count, report.total_count
                    ));
                } else {
                    logging::log_error(&format!(
                        "[{}] Scheduled {} sync failed: {}",
                        report.network,
                        report.mode,
                        report.error.as_deref().unwrap_or("unknown error")
                    ));
                }
            }

            if self.cancel.is_cancelled() {
                break;
            }
        }

        logging::log_info("Scheduled sync loop stopped");
    }
}

/// Every `full_resync_every`-th tick runs a full resync; 0 never does
pub fn mode_for_tick(tick: u64, full_resync_every: u32) -> SyncMode {
    if full_resync_every > 0 && tick % u64::from(full_resync_every) == 0 {
        SyncMode::Full
    } else {
        SyncMode::Incremental
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_for_tick() {
        let modes: Vec<SyncMode> = (1..=6).map(|t| mode_for_tick(t, 3)).collect();
        assert_eq!(
            modes,
            vec![
                SyncMode::Incremental,
                SyncMode::Incremental,
                SyncMode::Full,
                SyncMode::Incremental,
                SyncMode::Incremental,
                SyncMode::Full,
            ]
        );
        assert!((1..=100).all(|t| mode_for_tick(t, 0) == SyncMode::Incremental));
    }

    #[test]
    fn test_first_scheduled_tick_is_incremental() {
        assert_eq!(mode_for_tick(1, 12), SyncMode::Incremental);
        assert_eq!(mode_for_tick(1, 1), SyncMode::Full);
    }
}
