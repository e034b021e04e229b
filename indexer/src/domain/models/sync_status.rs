use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Network;

/// Per-network sync bookkeeping, used as a resume cursor and an advisory in-progress flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub network: Network,
    pub last_synced_id: Option<String>,
    pub last_synced_block: Option<i64>,
    pub total_stakes_synced: i64,
    pub sync_in_progress: bool,
    pub last_sync_started_at: Option<DateTime<Utc>>,
    pub last_sync_completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl SyncStatus {
    /// Status of a network that has never been synced
    pub fn never_synced(network: Network) -> Self {
        Self {
            network,
            last_synced_id: None,
            last_synced_block: None,
            total_stakes_synced: 0,
            sync_in_progress: false,
            last_sync_started_at: None,
            last_sync_completed_at: None,
            error_message: None,
        }
    }

    /// Whether an incremental sync can resume from this status
    ///
    /// Only the stake ID cursor is required; without a block cursor every end is fetched.
    pub fn has_cursor(&self) -> bool {
        self.last_synced_id.is_some()
    }
}

/// What a successful run reports back to the status tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub last_synced_id: Option<String>,
    pub last_synced_block: Option<i64>,
    pub total_stakes_synced: i64,
}
