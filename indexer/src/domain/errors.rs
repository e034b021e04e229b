use thiserror::Error;

use crate::config::Network;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::subgraph::SubgraphClientError;

/// Error type for the active-stake reconciler
///
/// Only raised on inputs that no correct caller produces.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("stake {stake_id} belongs to {found}, expected {expected}")]
    NetworkMismatch {
        expected: Network,
        found: Network,
        stake_id: String,
    },
}

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    GlobalInfo,
    StakeStarts,
    StakeEnds,
    Status,
    Snapshot,
    Upsert,
    Incremental,
}

impl std::fmt::Display for SyncStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncStage::GlobalInfo => "global info",
            SyncStage::StakeStarts => "stake starts",
            SyncStage::StakeEnds => "stake ends",
            SyncStage::Status => "sync status",
            SyncStage::Snapshot => "snapshot replace",
            SyncStage::Upsert => "batch upsert",
            SyncStage::Incremental => "incremental apply",
        };
        f.write_str(name)
    }
}

/// Error type for a sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("[{network}] fetching {stage} failed: {source}")]
    Fetch {
        network: Network,
        stage: SyncStage,
        #[source]
        source: SubgraphClientError,
    },

    #[error("reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("[{network}] {stage} failed: {source}")]
    Persistence {
        network: Network,
        stage: SyncStage,
        #[source]
        source: DbError,
    },

    #[error("[{0}] subgraph returned no global info, current day unknown")]
    MissingCurrentDay(Network),

    #[error("invalid sync state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("[{0}] sync cancelled")]
    Cancelled(Network),

    #[error("[{0}] a sync is already running in this process")]
    AlreadyRunning(Network),

    #[error("[{0}] network is not enabled")]
    NetworkDisabled(Network),
}

impl SyncError {
    pub fn fetch(network: Network, stage: SyncStage, source: SubgraphClientError) -> Self {
        match source {
            SubgraphClientError::Cancelled => SyncError::Cancelled(network),
            source => SyncError::Fetch {
                network,
                stage,
                source,
            },
        }
    }

    pub fn persistence(network: Network, stage: SyncStage, source: DbError) -> Self {
        SyncError::Persistence {
            network,
            stage,
            source,
        }
    }
}
