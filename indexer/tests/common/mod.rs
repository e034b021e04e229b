//! In-memory stand-ins for the subgraph and the database

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use stake_indexer::application::sync::{NetworkManager, SyncOrchestrator};
use stake_indexer::config::{
    AppConfig, DatabaseConfig, Network, SubgraphConfig, SyncConfig, WebConfig,
};
use stake_indexer::domain::models::{ActiveStake, GlobalInfo, StakeEnd, StakeStart, SyncStatus, SyncSummary};
use stake_indexer::domain::ports::{GlobalInfoStore, StakeEventSource, StakeStore, SyncStatusStore};
use stake_indexer::infrastructure::persistence::DbError;
use stake_indexer::infrastructure::subgraph::{EventFilter, FetchOptions, SubgraphClientError};
use stake_indexer::utils::CancelSignal;

#[derive(Default, Clone)]
pub struct NetworkEvents {
    pub starts: Vec<StakeStart>,
    pub ends: Vec<StakeEnd>,
    pub global_info: Option<GlobalInfo>,
    pub fail_with: Option<String>,
}

#[derive(Default)]
pub struct MemorySource {
    pub events: Mutex<HashMap<Network, NetworkEvents>>,
    pub start_filters: Mutex<Vec<(Network, EventFilter)>>,
    pub end_filters: Mutex<Vec<(Network, EventFilter)>>,
    /// Held by a test to park runs inside the fetch phase
    pub gate: tokio::sync::Mutex<()>,
}

impl MemorySource {
    pub fn set(&self, network: Network, events: NetworkEvents) {
        self.events.lock().unwrap().insert(network, events);
    }

    pub fn update(&self, network: Network, f: impl FnOnce(&mut NetworkEvents)) {
        let mut events = self.events.lock().unwrap();
        f(events.entry(network).or_default());
    }

    fn snapshot(&self, network: Network) -> Result<NetworkEvents, SubgraphClientError> {
        let events = self
            .events
            .lock()
            .unwrap()
            .get(&network)
            .cloned()
            .unwrap_or_default();
        match &events.fail_with {
            Some(message) => Err(SubgraphClientError::GraphqlError(message.clone())),
            None => Ok(events),
        }
    }
}

fn numeric_id(id: &str) -> u128 {
    id.parse().unwrap_or(0)
}

#[async_trait]
impl StakeEventSource for MemorySource {
    async fn fetch_stake_starts(
        &self,
        network: Network,
        options: &FetchOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<StakeStart>, SubgraphClientError> {
        if cancel.is_cancelled() {
            return Err(SubgraphClientError::Cancelled);
        }
        self.start_filters
            .lock()
            .unwrap()
            .push((network, options.filter.clone()));

        let starts = self.snapshot(network)?.starts;
        Ok(starts
            .into_iter()
            .filter(|s| match &options.filter {
                EventFilter::StakeIdAfter(cursor) => numeric_id(&s.stake_id) > numeric_id(cursor),
                EventFilter::BlockAfter(block) => s.block_number > *block,
                EventFilter::All => true,
            })
            .take(options.max_records)
            .collect())
    }

    async fn fetch_stake_ends(
        &self,
        network: Network,
        options: &FetchOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<StakeEnd>, SubgraphClientError> {
        if cancel.is_cancelled() {
            return Err(SubgraphClientError::Cancelled);
        }
        self.end_filters
            .lock()
            .unwrap()
            .push((network, options.filter.clone()));

        let ends = self.snapshot(network)?.ends;
        Ok(ends
            .into_iter()
            .filter(|e| match &options.filter {
                EventFilter::StakeIdAfter(cursor) => numeric_id(&e.stake_id) > numeric_id(cursor),
                EventFilter::BlockAfter(block) => e.block_number > *block,
                EventFilter::All => true,
            })
            .take(options.max_records)
            .collect())
    }

    async fn fetch_global_info(
        &self,
        network: Network,
    ) -> Result<Option<GlobalInfo>, SubgraphClientError> {
        let _gate = self.gate.lock().await;
        Ok(self.snapshot(network)?.global_info)
    }
}

#[derive(Default)]
pub struct MemoryStakeStore {
    pub rows: Mutex<BTreeMap<(String, Network), ActiveStake>>,
    pub poisoned: Mutex<HashSet<String>>,
    pub refreshes: Mutex<Vec<(Network, i32)>>,
}

impl MemoryStakeStore {
    pub fn keys(&self, network: Network) -> Vec<String> {
        self.rows
            .lock()
            .unwrap()
            .keys()
            .filter(|(_, n)| *n == network)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn get(&self, key: &str, network: Network) -> Option<ActiveStake> {
        self.rows
            .lock()
            .unwrap()
            .get(&(key.to_string(), network))
            .cloned()
    }

    pub fn insert(&self, stake: ActiveStake) {
        self.rows
            .lock()
            .unwrap()
            .insert((stake.persisted_stake_id(), stake.network()), stake);
    }
}

#[async_trait]
impl StakeStore for MemoryStakeStore {
    async fn upsert_stake_chunk(&self, chunk: &[ActiveStake]) -> Result<u64, DbError> {
        let poisoned = self.poisoned.lock().unwrap().clone();
        if chunk.iter().any(|s| poisoned.contains(&s.persisted_stake_id())) {
            return Err(DbError::QueryError("invalid input syntax".into()));
        }

        let mut rows = self.rows.lock().unwrap();
        for stake in chunk {
            let key = (stake.persisted_stake_id(), stake.network());
            match rows.get_mut(&key) {
                // only derived columns change on conflict
                Some(existing) => {
                    existing.is_active = stake.is_active;
                    existing.days_served = stake.days_served;
                    existing.days_left = stake.days_left;
                }
                None => {
                    rows.insert(key, stake.clone());
                }
            }
        }
        Ok(chunk.len() as u64)
    }

    async fn delete_network_stakes(&self, network: Network) -> Result<u64, DbError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|(_, n), _| *n != network);
        Ok((before - rows.len()) as u64)
    }

    async fn delete_stakes(&self, network: Network, ids: &[String]) -> Result<u64, DbError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(ids
            .iter()
            .filter(|id| rows.remove(&((*id).clone(), network)).is_some())
            .count() as u64)
    }

    async fn refresh_derived_fields(&self, network: Network, current_day: i32) -> Result<u64, DbError> {
        self.refreshes.lock().unwrap().push((network, current_day));
        let mut rows = self.rows.lock().unwrap();
        let mut touched = 0;
        for ((_, n), stake) in rows.iter_mut() {
            if *n == network {
                stake.days_served = (current_day - stake.start.start_day).max(0);
                stake.days_left = (stake.start.end_day - current_day).max(0);
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn count_active(&self, network: Network) -> Result<u64, DbError> {
        Ok(self.keys(network).len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryGlobalInfoStore {
    pub rows: Mutex<BTreeMap<(Network, i32), GlobalInfo>>,
}

#[async_trait]
impl GlobalInfoStore for MemoryGlobalInfoStore {
    async fn upsert_global_info(&self, info: &GlobalInfo) -> Result<(), DbError> {
        self.rows
            .lock()
            .unwrap()
            .insert((info.network, info.hex_day), info.clone());
        Ok(())
    }

    async fn latest_global_info(&self, network: Network) -> Result<Option<GlobalInfo>, DbError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|g| g.network == network)
            .max_by_key(|g| g.hex_day)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryStatusStore {
    pub statuses: Mutex<HashMap<Network, SyncStatus>>,
    /// `(network, "started" | "completed" | "failed")` in call order
    pub history: Mutex<Vec<(Network, &'static str)>>,
}

impl MemoryStatusStore {
    pub fn current(&self, network: Network) -> SyncStatus {
        self.statuses
            .lock()
            .unwrap()
            .get(&network)
            .cloned()
            .unwrap_or_else(|| SyncStatus::never_synced(network))
    }

    pub fn history_for(&self, network: Network) -> Vec<&'static str> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| *n == network)
            .map(|(_, event)| *event)
            .collect()
    }
}

#[async_trait]
impl SyncStatusStore for MemoryStatusStore {
    async fn mark_sync_started(&self, network: Network) -> Result<SyncStatus, DbError> {
        self.history.lock().unwrap().push((network, "started"));
        let mut statuses = self.statuses.lock().unwrap();
        let entry = statuses
            .entry(network)
            .or_insert_with(|| SyncStatus::never_synced(network));
        let previous = entry.clone();
        entry.sync_in_progress = true;
        entry.last_sync_started_at = Some(chrono::Utc::now());
        entry.error_message = None;
        Ok(previous)
    }

    async fn mark_sync_completed(&self, network: Network, summary: &SyncSummary) -> Result<(), DbError> {
        self.history.lock().unwrap().push((network, "completed"));
        let mut statuses = self.statuses.lock().unwrap();
        let entry = statuses
            .entry(network)
            .or_insert_with(|| SyncStatus::never_synced(network));
        entry.last_synced_id = summary.last_synced_id.clone();
        entry.last_synced_block = summary.last_synced_block;
        entry.total_stakes_synced = summary.total_stakes_synced;
        entry.sync_in_progress = false;
        entry.last_sync_completed_at = Some(chrono::Utc::now());
        entry.error_message = None;
        Ok(())
    }

    async fn mark_sync_failed(&self, network: Network, error: &str) -> Result<(), DbError> {
        self.history.lock().unwrap().push((network, "failed"));
        let mut statuses = self.statuses.lock().unwrap();
        let entry = statuses
            .entry(network)
            .or_insert_with(|| SyncStatus::never_synced(network));
        entry.sync_in_progress = false;
        entry.error_message = Some(error.to_string());
        Ok(())
    }

    async fn get_status(&self, network: Network) -> Result<Option<SyncStatus>, DbError> {
        Ok(self.statuses.lock().unwrap().get(&network).cloned())
    }

    async fn list_statuses(&self) -> Result<Vec<SyncStatus>, DbError> {
        let mut all: Vec<SyncStatus> = self.statuses.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|s| s.network);
        Ok(all)
    }
}

/// A wired-up manager plus handles on every fake behind it
pub struct Harness {
    pub source: Arc<MemorySource>,
    pub stakes: Arc<MemoryStakeStore>,
    pub global_info: Arc<MemoryGlobalInfoStore>,
    pub status: Arc<MemoryStatusStore>,
    pub cancel: CancelSignal,
    pub manager: Arc<NetworkManager>,
}

pub fn test_config(enabled: &[Network]) -> AppConfig {
    AppConfig {
        subgraphs: Network::ALL
            .iter()
            .map(|network| SubgraphConfig {
                network: *network,
                url: format!("http://localhost:8000/subgraphs/name/{}", network),
                enabled: enabled.contains(network),
            })
            .collect(),
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
        },
        sync: SyncConfig {
            page_size: 100,
            max_records: 10_000,
            page_delay_ms: 0,
            batch_size: 2,
            max_retries: 2,
            retry_base_delay_ms: 1,
            request_timeout_secs: 5,
            interval_secs: 60,
            full_resync_every: 3,
        },
        web: WebConfig { api_port: 0 },
    }
}

pub fn harness(enabled: &[Network]) -> Harness {
    let config = test_config(enabled);
    let source = Arc::new(MemorySource::default());
    let stakes = Arc::new(MemoryStakeStore::default());
    let global_info = Arc::new(MemoryGlobalInfoStore::default());
    let status = Arc::new(MemoryStatusStore::default());
    let cancel = CancelSignal::new();

    let orchestrator = SyncOrchestrator::new(
        source.clone(),
        stakes.clone(),
        global_info.clone(),
        status.clone(),
        config.sync.clone(),
    );
    let manager = Arc::new(NetworkManager::new(
        config,
        Arc::new(orchestrator),
        status.clone(),
        cancel.clone(),
    ));

    Harness {
        source,
        stakes,
        global_info,
        status,
        cancel,
        manager,
    }
}

pub fn start(network: Network, id: &str, start_day: i32, end_day: i32, block: i64) -> StakeStart {
    StakeStart {
        stake_id: id.to_string(),
        network,
        staker_address: "0x00000000000000000000000000000000000000aa".to_string(),
        staked_amount: "100000000000".to_string(),
        stake_shares: "250000000000".to_string(),
        stake_t_shares: "0.25".to_string(),
        staked_days: end_day - start_day,
        start_day,
        end_day,
        timestamp: 1_600_000_000,
        is_auto_stake: false,
        transaction_hash: format!("0x{}{}", network, id),
        block_number: block,
    }
}

pub fn end(network: Network, id: &str, block: i64) -> StakeEnd {
    StakeEnd {
        stake_id: id.to_string(),
        network,
        staker_address: "0x00000000000000000000000000000000000000aa".to_string(),
        payout: "1".to_string(),
        penalty: "0".to_string(),
        served_days: 10,
        timestamp: 1_600_100_000,
        transaction_hash: format!("0xend{}{}", network, id),
        block_number: block,
    }
}

pub fn global_info(network: Network, hex_day: i32) -> GlobalInfo {
    GlobalInfo {
        network,
        hex_day,
        stake_shares_total: "1000".to_string(),
        stake_penalty_total: "0".to_string(),
        locked_hearts_total: "5000".to_string(),
        share_rate: Some("100000".to_string()),
        latest_stake_id: None,
        timestamp: 1_600_000_000,
        block_number: Some(10_000_000),
    }
}
