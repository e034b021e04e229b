//! Structured result of a sync run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::sync::batch_processor::ChunkFailure;
use crate::application::sync::state::{SyncMode, SyncState};
use crate::config::Network;
use crate::domain::errors::SyncError;

/// One line of a run's operation log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLog {
    pub at: DateTime<Utc>,
    pub state: SyncState,
    pub message: String,
}

/// Outcome of one network's sync, returned to every caller instead of an error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub network: Network,
    pub mode: SyncMode,
    pub success: bool,
    /// Rows written by the upsert phase
    pub inserted_count: u64,
    /// Active rows stored for the network once the run finished
    pub total_count: u64,
    pub failed_chunks: Vec<ChunkFailure>,
    pub operations: Vec<OperationLog>,
    pub error: Option<String>,
    pub final_state: SyncState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    /// Report for a request turned away before a run started
    pub fn rejected(network: Network, mode: SyncMode, error: &SyncError) -> Self {
        let now = Utc::now();
        Self {
            network,
            mode,
            success: false,
            inserted_count: 0,
            total_count: 0,
            failed_chunks: Vec::new(),
            operations: vec![OperationLog {
                at: now,
                state: SyncState::Idle,
                message: error.to_string(),
            }],
            error: Some(error.to_string()),
            final_state: SyncState::Idle,
            started_at: now,
            finished_at: now,
        }
    }

    pub fn has_partial_failures(&self) -> bool {
        !self.failed_chunks.is_empty()
    }
}
