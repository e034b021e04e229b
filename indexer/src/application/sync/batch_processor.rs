//! Chunked writes of reconciled stakes
//!
//! Chunks go out one after another. A chunk that still fails after its retries is
//! recorded and skipped, unless the database itself is unreachable.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Network, SyncConfig};
use crate::domain::errors::{SyncError, SyncStage};
use crate::domain::models::{ActiveStake, GlobalInfo, StakeEnd};
use crate::domain::ports::{GlobalInfoStore, StakeStore};
use crate::infrastructure::persistence::error::DbError;
use crate::utils::cancel::CancelSignal;
use crate::utils::logging;
use crate::utils::RetryHandler;

/// A chunk that could not be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkFailure {
    pub chunk_index: usize,
    pub first_key: String,
    pub last_key: String,
    pub rows: usize,
    pub error: String,
}

/// What a batch write achieved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Records handed to the batch
    pub attempted: usize,
    /// Rows reported written by the store
    pub inserted: u64,
    /// Rows deleted before writing (snapshot replace only)
    pub deleted: u64,
    pub chunks: usize,
    pub failed_chunks: Vec<ChunkFailure>,
}

/// Writes stakes and global records through the store ports
#[derive(Clone)]
pub struct BatchWriter {
    stakes: Arc<dyn StakeStore>,
    global_info: Arc<dyn GlobalInfoStore>,
    batch_size: usize,
    retry_handler: RetryHandler,
}

impl BatchWriter {
    pub fn new(
        stakes: Arc<dyn StakeStore>,
        global_info: Arc<dyn GlobalInfoStore>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            stakes,
            global_info,
            batch_size: config.batch_size.max(1),
            retry_handler: RetryHandler::with_config(
                config.max_retries,
                config.retry_base_delay_ms,
            ),
        }
    }

    /// Upsert stakes in chunks of `batch_size`
    ///
    /// Cancellation is checked before each chunk; a chunk already sent always finishes.
    pub async fn upsert_stake_starts_batch(
        &self,
        network: Network,
        records: &[ActiveStake],
        cancel: &CancelSignal,
    ) -> Result<BatchOutcome, SyncError> {
        let mut outcome = BatchOutcome {
            attempted: records.len(),
            ..BatchOutcome::default()
        };

        if records.is_empty() {
            logging::log_info(&format!("[{}] No stakes to write", network));
            return Ok(outcome);
        }

        let chunk_count = records.len().div_ceil(self.batch_size);

        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            if cancel.is_cancelled() {
                logging::log_warning(&format!(
                    "[{}] ⏹️ Cancelled before chunk {}/{}",
                    network,
                    index + 1,
                    chunk_count
                ));
                return Err(SyncError::Cancelled(network));
            }

            outcome.chunks += 1;
            let operation_name = format!("stake chunk {}/{}", index + 1, chunk_count);

            match self
                .retry_handler
                .execute_with_retry_if(
                    || self.stakes.upsert_stake_chunk(chunk),
                    DbError::is_transient,
                    &operation_name,
                    network.as_str(),
                )
                .await
            {
                Ok(rows) => {
                    outcome.inserted += rows;
                    logging::log_debug(&format!(
                        "[{}] 💾 {} wrote {} rows",
                        network, operation_name, rows
                    ));
                }
                Err(e) if e.is_connection_failure() => {
                    logging::log_error(&format!(
                        "[{}] ❌ Database unreachable at {}: {}",
                        network, operation_name, e
                    ));
                    return Err(SyncError::persistence(network, SyncStage::Upsert, e));
                }
                Err(e) => {
                    let failure = chunk_failure(index, chunk, &e);
                    logging::log_warning(&format!(
                        "[{}] ⚠️ {} failed ({}..{}), continuing: {}",
                        network, operation_name, failure.first_key, failure.last_key, e
                    ));
                    outcome.failed_chunks.push(failure);
                }
            }
        }

        logging::log_info(&format!(
            "[{}] ✅ Wrote {} rows in {} chunks ({} failed)",
            network,
            outcome.inserted,
            outcome.chunks,
            outcome.failed_chunks.len()
        ));

        Ok(outcome)
    }

    /// Delete the network's rows, then write `records` as its new snapshot
    pub async fn replace_network_snapshot(
        &self,
        network: Network,
        records: &[ActiveStake],
        cancel: &CancelSignal,
    ) -> Result<BatchOutcome, SyncError> {
        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled(network));
        }

        let deleted = self
            .retry_handler
            .execute_with_retry_if(
                || self.stakes.delete_network_stakes(network),
                DbError::is_transient,
                "snapshot delete",
                network.as_str(),
            )
            .await
            .map_err(|e| SyncError::persistence(network, SyncStage::Snapshot, e))?;

        logging::log_info(&format!(
            "[{}] 🗑️ Cleared {} stored stakes before snapshot write",
            network, deleted
        ));

        let mut outcome = self
            .upsert_stake_starts_batch(network, records, cancel)
            .await?;
        outcome.deleted = deleted;
        Ok(outcome)
    }

    /// Delete rows closed by `ends`
    pub async fn remove_ended_stakes(
        &self,
        network: Network,
        ends: &[StakeEnd],
    ) -> Result<u64, SyncError> {
        let keys: Vec<String> = ends.iter().map(StakeEnd::persisted_stake_id).collect();
        let mut removed = 0;

        for chunk in keys.chunks(self.batch_size) {
            removed += self
                .retry_handler
                .execute_with_retry_if(
                    || self.stakes.delete_stakes(network, chunk),
                    DbError::is_transient,
                    "ended stake delete",
                    network.as_str(),
                )
                .await
                .map_err(|e| SyncError::persistence(network, SyncStage::Incremental, e))?;
        }

        if removed > 0 {
            logging::log_info(&format!("[{}] 🗑️ Removed {} ended stakes", network, removed));
        }

        Ok(removed)
    }

    /// Recompute derived day fields for every stored row of the network
    pub async fn refresh_derived_fields(
        &self,
        network: Network,
        current_day: i32,
    ) -> Result<u64, SyncError> {
        self.retry_handler
            .execute_with_retry_if(
                || self.stakes.refresh_derived_fields(network, current_day),
                DbError::is_transient,
                "derived field refresh",
                network.as_str(),
            )
            .await
            .map_err(|e| SyncError::persistence(network, SyncStage::Incremental, e))
    }

    pub async fn upsert_global_info(&self, info: &GlobalInfo) -> Result<(), DbError> {
        self.retry_handler
            .execute_with_retry_if(
                || self.global_info.upsert_global_info(info),
                DbError::is_transient,
                "global info upsert",
                info.network.as_str(),
            )
            .await
    }
}

fn chunk_failure(index: usize, chunk: &[ActiveStake], error: &DbError) -> ChunkFailure {
    let key = |stake: Option<&ActiveStake>| {
        stake
            .map(ActiveStake::persisted_stake_id)
            .unwrap_or_default()
    };

    ChunkFailure {
        chunk_index: index,
        first_key: key(chunk.first()),
        last_key: key(chunk.last()),
        rows: chunk.len(),
        error: error.to_string(),
    }
}
