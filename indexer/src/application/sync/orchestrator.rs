//! One network's sync run: fetch, reconcile, persist, record status

use chrono::Utc;
use std::sync::Arc;

use crate::application::sync::batch_processor::{BatchOutcome, BatchWriter, ChunkFailure};
use crate::application::sync::report::{OperationLog, SyncReport};
use crate::application::sync::state::{SyncMode, SyncState, SyncStateMachine};
use crate::config::{Network, SyncConfig};
use crate::domain::errors::{SyncError, SyncStage};
use crate::domain::models::{StakeEnd, StakeStart, SyncStatus, SyncSummary};
use crate::domain::ports::{GlobalInfoStore, StakeEventSource, StakeStore, SyncStatusStore};
use crate::domain::services::{reconcile, split_namespaced_key};
use crate::infrastructure::subgraph::{EventFilter, FetchOptions};
use crate::utils::cancel::CancelSignal;
use crate::utils::logging;

/// Bookkeeping for a single run
struct RunContext {
    network: Network,
    machine: SyncStateMachine,
    operations: Vec<OperationLog>,
}

impl RunContext {
    fn new(network: Network) -> Self {
        Self {
            network,
            machine: SyncStateMachine::new(),
            operations: Vec::new(),
        }
    }

    fn record(&mut self, message: String) {
        logging::log_info(&format!("[{}] {}", self.network, message));
        self.push(message);
    }

    fn record_warning(&mut self, message: String) {
        logging::log_warning(&format!("[{}] ⚠️ {}", self.network, message));
        self.push(message);
    }

    fn push(&mut self, message: String) {
        self.operations.push(OperationLog {
            at: Utc::now(),
            state: self.machine.state(),
            message,
        });
    }

    fn enter(&mut self, next: SyncState) -> Result<(), SyncError> {
        self.machine.transition(next)?;
        self.record(format!("entered {}", next));
        Ok(())
    }
}

/// What the persisting phase produced
struct RunOutcome {
    inserted: u64,
    total: u64,
    failed_chunks: Vec<ChunkFailure>,
    summary: SyncSummary,
}

/// Drives a single network through fetch, reconcile and persist
pub struct SyncOrchestrator {
    source: Arc<dyn StakeEventSource>,
    stakes: Arc<dyn StakeStore>,
    global_info: Arc<dyn GlobalInfoStore>,
    status: Arc<dyn SyncStatusStore>,
    writer: BatchWriter,
    config: SyncConfig,
}

impl SyncOrchestrator {
    pub fn new(
        source: Arc<dyn StakeEventSource>,
        stakes: Arc<dyn StakeStore>,
        global_info: Arc<dyn GlobalInfoStore>,
        status: Arc<dyn SyncStatusStore>,
        config: SyncConfig,
    ) -> Self {
        let writer = BatchWriter::new(stakes.clone(), global_info.clone(), &config);
        Self {
            source,
            stakes,
            global_info,
            status,
            writer,
            config,
        }
    }

    /// Run one sync; every outcome, including failure, comes back as a report
    pub async fn run(&self, network: Network, mode: SyncMode, cancel: &CancelSignal) -> SyncReport {
        let started_at = Utc::now();
        let mut ctx = RunContext::new(network);
        let mut effective_mode = mode;

        logging::log_info(&format!("[{}] 🔄 Starting {} sync", network, mode));

        let result = match self.status.mark_sync_started(network).await {
            Ok(previous) => {
                if previous.sync_in_progress {
                    ctx.record_warning(
                        "stored status still marked in progress from an earlier run, overriding"
                            .to_string(),
                    );
                }

                if mode == SyncMode::Incremental && !previous.has_cursor() {
                    ctx.record("no stored cursor, falling back to full resync".to_string());
                    effective_mode = SyncMode::Full;
                }

                self.execute(&mut ctx, effective_mode, &previous, cancel).await
            }
            Err(e) => Err(SyncError::persistence(network, SyncStage::Status, e)),
        };

        let mut report = SyncReport {
            network,
            mode: effective_mode,
            success: false,
            inserted_count: 0,
            total_count: 0,
            failed_chunks: Vec::new(),
            operations: Vec::new(),
            error: None,
            final_state: SyncState::Idle,
            started_at,
            finished_at: started_at,
        };

        match result {
            Ok(outcome) => {
                self.complete(&mut ctx, &outcome).await;
                report.success = true;
                report.inserted_count = outcome.inserted;
                report.total_count = outcome.total;
                report.failed_chunks = outcome.failed_chunks;
            }
            Err(e) => {
                self.fail(&mut ctx, &e).await;
                report.error = Some(e.to_string());
            }
        }

        report.final_state = ctx.machine.state();
        report.operations = ctx.operations;
        report.finished_at = Utc::now();
        report
    }

    async fn execute(
        &self,
        ctx: &mut RunContext,
        mode: SyncMode,
        previous: &SyncStatus,
        cancel: &CancelSignal,
    ) -> Result<RunOutcome, SyncError> {
        let network = ctx.network;

        ctx.enter(SyncState::Fetching)?;
        let base = FetchOptions::new(
            self.config.page_size,
            self.config.max_records,
            self.config.page_delay(),
        );
        let (start_options, end_options) = match mode {
            SyncMode::Full => (base.clone(), base),
            SyncMode::Incremental => (
                base.clone().with_filter(match &previous.last_synced_id {
                    Some(id) => EventFilter::StakeIdAfter(id.clone()),
                    None => EventFilter::All,
                }),
                base.with_filter(match previous.last_synced_block {
                    Some(block) => EventFilter::BlockAfter(block),
                    None => EventFilter::All,
                }),
            ),
        };

        let (global_info, starts, ends) = tokio::join!(
            self.source.fetch_global_info(network),
            self.source.fetch_stake_starts(network, &start_options, cancel),
            self.source.fetch_stake_ends(network, &end_options, cancel),
        );

        let global_info = global_info
            .map_err(|e| SyncError::fetch(network, SyncStage::GlobalInfo, e))?
            .ok_or(SyncError::MissingCurrentDay(network))?;
        let starts = starts.map_err(|e| SyncError::fetch(network, SyncStage::StakeStarts, e))?;
        let ends = ends.map_err(|e| SyncError::fetch(network, SyncStage::StakeEnds, e))?;

        ctx.record(format!(
            "fetched {} starts, {} ends, current day {}",
            starts.len(),
            ends.len(),
            global_info.current_day()
        ));

        if cancel.is_cancelled() {
            return Err(SyncError::Cancelled(network));
        }

        ctx.enter(SyncState::Reconciling)?;
        let current_day = global_info.current_day();
        let reconciliation = reconcile(&starts, &ends, current_day)?;
        ctx.record(format!(
            "{} active, {} ended, {} orphaned ends, {} duplicate starts",
            reconciliation.active.len(),
            reconciliation.ended,
            reconciliation.orphaned_ends,
            reconciliation.duplicate_starts
        ));

        ctx.enter(SyncState::Persisting)?;
        match self.global_info.latest_global_info(network).await {
            Ok(Some(stored)) if stored.hex_day > current_day => ctx.record_warning(format!(
                "subgraph is on day {}, behind stored day {}",
                current_day, stored.hex_day
            )),
            Ok(Some(stored)) if stored.hex_day < current_day => ctx.record(format!(
                "current day advanced from {} to {}",
                stored.hex_day, current_day
            )),
            Ok(_) => {}
            Err(e) => ctx.record_warning(format!("could not read stored global info: {}", e)),
        }

        match self.writer.upsert_global_info(&global_info).await {
            Ok(()) => ctx.record(format!("stored global info for day {}", current_day)),
            Err(e) if e.is_connection_failure() => {
                return Err(SyncError::persistence(network, SyncStage::GlobalInfo, e));
            }
            Err(e) => ctx.record_warning(format!("global info not stored: {}", e)),
        }

        let outcome: BatchOutcome = match mode {
            SyncMode::Full => {
                self.writer
                    .replace_network_snapshot(network, &reconciliation.active, cancel)
                    .await?
            }
            SyncMode::Incremental => {
                let removed = self.writer.remove_ended_stakes(network, &ends).await?;
                ctx.record(format!("removed {} ended stakes", removed));

                let outcome = self
                    .writer
                    .upsert_stake_starts_batch(network, &reconciliation.active, cancel)
                    .await?;

                let refreshed = self
                    .writer
                    .refresh_derived_fields(network, current_day)
                    .await?;
                ctx.record(format!("refreshed derived fields on {} rows", refreshed));
                outcome
            }
        };

        ctx.record(format!(
            "wrote {} of {} stakes in {} chunks",
            outcome.inserted, outcome.attempted, outcome.chunks
        ));
        for failure in &outcome.failed_chunks {
            ctx.record_warning(format!(
                "chunk {} ({}..{}, {} rows) failed: {}",
                failure.chunk_index, failure.first_key, failure.last_key, failure.rows, failure.error
            ));
        }

        let total = match self.stakes.count_active(network).await {
            Ok(total) => total,
            Err(e) => {
                ctx.record_warning(format!("could not count stored stakes: {}", e));
                outcome.inserted
            }
        };

        let ends_truncated = ends.len() >= self.config.max_records;
        if ends_truncated {
            ctx.record_warning(format!(
                "stake ends hit the {} record ceiling, block cursor not advanced",
                self.config.max_records
            ));
        }

        let summary = next_cursor(
            previous,
            &starts,
            &ends,
            &outcome.failed_chunks,
            ends_truncated,
            total,
        );
        if !outcome.failed_chunks.is_empty() {
            ctx.record_warning(format!(
                "stake cursor held at {} so failed chunks are fetched again",
                summary.last_synced_id.as_deref().unwrap_or("none")
            ));
        }

        Ok(RunOutcome {
            inserted: outcome.inserted,
            total,
            failed_chunks: outcome.failed_chunks,
            summary,
        })
    }

    async fn complete(&self, ctx: &mut RunContext, outcome: &RunOutcome) {
        if let Err(e) = ctx.enter(SyncState::Completed) {
            logging::log_error(&format!("[{}] {}", ctx.network, e));
            return;
        }

        if let Err(e) = self
            .status
            .mark_sync_completed(ctx.network, &outcome.summary)
            .await
        {
            ctx.record_warning(format!("could not record completion: {}", e));
        }

        logging::log_info(&format!(
            "[{}] ✅ Sync completed: {} written, {} stored, {} failed chunks",
            ctx.network,
            outcome.inserted,
            outcome.total,
            outcome.failed_chunks.len()
        ));
    }

    async fn fail(&self, ctx: &mut RunContext, error: &SyncError) {
        if !ctx.machine.state().is_terminal() {
            // Every non-terminal state has an edge to Failed
            let _ = ctx.machine.transition(SyncState::Failed);
        }
        ctx.push(error.to_string());
        logging::log_error(&format!("[{}] ❌ Sync failed: {}", ctx.network, error));

        if let Err(e) = self
            .status
            .mark_sync_failed(ctx.network, &error.to_string())
            .await
        {
            logging::log_error(&format!(
                "[{}] Could not record sync failure: {}",
                ctx.network, e
            ));
        }
    }
}

/// Cursor to store after a successful run
///
/// The stake ID cursor follows starts only, since incremental runs filter starts by it,
/// and stays below the lowest stake of any failed chunk so the next run fetches it again.
/// The block cursor follows ends only, since incremental runs filter ends by it, and is
/// left alone when the ends fetch was cut off by the record ceiling.
/// A run that saw no new events keeps the previous cursor.
pub fn next_cursor(
    previous: &SyncStatus,
    starts: &[StakeStart],
    ends: &[StakeEnd],
    failed_chunks: &[ChunkFailure],
    ends_truncated: bool,
    total: u64,
) -> SyncSummary {
    let ceiling = lowest_failed_stake_id(failed_chunks);
    let below_ceiling = |id: &u128| ceiling.map_or(true, |c| *id < c);

    let highest_id = starts
        .iter()
        .filter_map(|s| s.stake_id.parse::<u128>().ok())
        .chain(
            previous
                .last_synced_id
                .as_deref()
                .and_then(|id| id.parse::<u128>().ok()),
        )
        .filter(below_ceiling)
        .max();

    let last_synced_id = match (highest_id, ceiling) {
        (Some(id), _) => Some(id.to_string()),
        (None, None) => previous.last_synced_id.clone(),
        // Nothing safe to resume from: the next incremental run falls back to full
        (None, Some(_)) => None,
    };

    let last_synced_block = if ends_truncated {
        previous.last_synced_block
    } else {
        ends.iter()
            .map(|e| e.block_number)
            .chain(previous.last_synced_block)
            .max()
    };

    SyncSummary {
        last_synced_id,
        last_synced_block,
        total_stakes_synced: i64::try_from(total).unwrap_or(i64::MAX),
    }
}

/// Lowest raw stake ID across failed chunks; an unparsable key pins it to zero
fn lowest_failed_stake_id(failed_chunks: &[ChunkFailure]) -> Option<u128> {
    failed_chunks
        .iter()
        .flat_map(|f| [f.first_key.as_str(), f.last_key.as_str()])
        .map(|key| {
            split_namespaced_key(key)
                .and_then(|(_, raw)| raw.parse::<u128>().ok())
                .unwrap_or(0)
        })
        .min()
}
