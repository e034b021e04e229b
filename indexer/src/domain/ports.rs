//! Interfaces the sync pipeline talks to
//!
//! Production implementations live in `infrastructure`: the subgraph client for
//! `StakeEventSource` and the sea-orm repositories for the three stores.

use async_trait::async_trait;

use crate::config::Network;
use crate::domain::models::{ActiveStake, GlobalInfo, StakeEnd, StakeStart, SyncStatus, SyncSummary};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::subgraph::{FetchOptions, SubgraphClientError};
use crate::utils::cancel::CancelSignal;

/// Paginated read access to a network's stake event log
#[async_trait]
pub trait StakeEventSource: Send + Sync {
    /// Fetch `StakeStart` events in ascending stake ID order
    async fn fetch_stake_starts(
        &self,
        network: Network,
        options: &FetchOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<StakeStart>, SubgraphClientError>;

    /// Fetch `StakeEnd` events in ascending stake ID order
    async fn fetch_stake_ends(
        &self,
        network: Network,
        options: &FetchOptions,
        cancel: &CancelSignal,
    ) -> Result<Vec<StakeEnd>, SubgraphClientError>;

    /// Fetch the latest daily global record, if the subgraph has one
    async fn fetch_global_info(
        &self,
        network: Network,
    ) -> Result<Option<GlobalInfo>, SubgraphClientError>;
}

/// Row-level access to persisted active stakes
#[async_trait]
pub trait StakeStore: Send + Sync {
    /// Upsert one chunk keyed by `(persisted_stake_id, network)`; returns rows written
    ///
    /// On conflict only the derived columns change.
    async fn upsert_stake_chunk(&self, chunk: &[ActiveStake]) -> Result<u64, DbError>;

    /// Delete every stake row of a network
    async fn delete_network_stakes(&self, network: Network) -> Result<u64, DbError>;

    /// Delete specific stake rows by persisted key
    async fn delete_stakes(
        &self,
        network: Network,
        persisted_stake_ids: &[String],
    ) -> Result<u64, DbError>;

    /// Recompute `days_served` / `days_left` for every row of a network
    async fn refresh_derived_fields(&self, network: Network, current_day: i32)
        -> Result<u64, DbError>;

    /// Number of active stake rows for a network
    async fn count_active(&self, network: Network) -> Result<u64, DbError>;
}

/// Daily global records
#[async_trait]
pub trait GlobalInfoStore: Send + Sync {
    /// Insert or refresh the record for `(network, hex_day)`
    async fn upsert_global_info(&self, info: &GlobalInfo) -> Result<(), DbError>;

    /// Most recent stored record for a network
    async fn latest_global_info(&self, network: Network) -> Result<Option<GlobalInfo>, DbError>;
}

/// Per-network sync bookkeeping
#[async_trait]
pub trait SyncStatusStore: Send + Sync {
    /// Flag a run as started; returns the status as it was before
    async fn mark_sync_started(&self, network: Network) -> Result<SyncStatus, DbError>;

    async fn mark_sync_completed(&self, network: Network, summary: &SyncSummary)
        -> Result<(), DbError>;

    async fn mark_sync_failed(&self, network: Network, error: &str) -> Result<(), DbError>;

    async fn get_status(&self, network: Network) -> Result<Option<SyncStatus>, DbError>;

    async fn list_statuses(&self) -> Result<Vec<SyncStatus>, DbError>;
}
