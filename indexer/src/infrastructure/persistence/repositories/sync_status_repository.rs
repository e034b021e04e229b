//! Repository for sync_status operations
//! One row per network; rows are created on first use if the seed is missing

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use std::fmt;

use crate::config::Network;
use crate::domain::models::{SyncStatus, SyncSummary};
use crate::domain::ports::SyncStatusStore;
use crate::infrastructure::persistence::entities::sync_status;
use crate::infrastructure::persistence::error::DbError;

/// Repository for per-network sync bookkeeping
#[derive(Clone)]
pub struct SyncStatusRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for SyncStatusRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStatusRepository").finish_non_exhaustive()
    }
}

impl SyncStatusRepository {
    /// Create a new SyncStatusRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert `row`, or update only `columns` if the network already has one
    async fn upsert(
        &self,
        row: sync_status::ActiveModel,
        columns: Vec<sync_status::Column>,
    ) -> Result<(), DbError> {
        sync_status::Entity::insert(row)
            .on_conflict(
                OnConflict::column(sync_status::Column::Network)
                    .update_columns(columns)
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }
}

fn blank_row(network: Network) -> sync_status::ActiveModel {
    sync_status::ActiveModel {
        network: Set(network.as_str().to_string()),
        last_synced_id: Set(None),
        last_synced_block: Set(None),
        total_stakes_synced: Set(0),
        sync_in_progress: Set(false),
        last_sync_started_at: Set(None),
        last_sync_completed_at: Set(None),
        error_message: Set(None),
        updated_at: Set(Utc::now().into()),
    }
}

fn to_domain(model: sync_status::Model) -> Result<SyncStatus, DbError> {
    let network: Network = model
        .network
        .parse()
        .map_err(|e| DbError::Other(format!("sync_status row: {}", e)))?;

    Ok(SyncStatus {
        network,
        last_synced_id: model.last_synced_id,
        last_synced_block: model.last_synced_block,
        total_stakes_synced: model.total_stakes_synced,
        sync_in_progress: model.sync_in_progress,
        last_sync_started_at: model.last_sync_started_at.map(|t| t.with_timezone(&Utc)),
        last_sync_completed_at: model.last_sync_completed_at.map(|t| t.with_timezone(&Utc)),
        error_message: model.error_message,
    })
}

#[async_trait]
impl SyncStatusStore for SyncStatusRepository {
    async fn mark_sync_started(&self, network: Network) -> Result<SyncStatus, DbError> {
        let previous = self
            .get_status(network)
            .await?
            .unwrap_or_else(|| SyncStatus::never_synced(network));

        let mut row = blank_row(network);
        row.sync_in_progress = Set(true);
        row.last_sync_started_at = Set(Some(Utc::now().into()));

        self.upsert(
            row,
            vec![
                sync_status::Column::SyncInProgress,
                sync_status::Column::LastSyncStartedAt,
                sync_status::Column::ErrorMessage,
                sync_status::Column::UpdatedAt,
            ],
        )
        .await?;

        Ok(previous)
    }

    async fn mark_sync_completed(
        &self,
        network: Network,
        summary: &SyncSummary,
    ) -> Result<(), DbError> {
        let mut row = blank_row(network);
        row.last_synced_id = Set(summary.last_synced_id.clone());
        row.last_synced_block = Set(summary.last_synced_block);
        row.total_stakes_synced = Set(summary.total_stakes_synced);
        row.last_sync_completed_at = Set(Some(Utc::now().into()));

        self.upsert(
            row,
            vec![
                sync_status::Column::LastSyncedId,
                sync_status::Column::LastSyncedBlock,
                sync_status::Column::TotalStakesSynced,
                sync_status::Column::SyncInProgress,
                sync_status::Column::LastSyncCompletedAt,
                sync_status::Column::ErrorMessage,
                sync_status::Column::UpdatedAt,
            ],
        )
        .await
    }

    async fn mark_sync_failed(&self, network: Network, error: &str) -> Result<(), DbError> {
        let mut row = blank_row(network);
        row.error_message = Set(Some(error.to_string()));

        self.upsert(
            row,
            vec![
                sync_status::Column::SyncInProgress,
                sync_status::Column::ErrorMessage,
                sync_status::Column::UpdatedAt,
            ],
        )
        .await
    }

    async fn get_status(&self, network: Network) -> Result<Option<SyncStatus>, DbError> {
        let result = sync_status::Entity::find()
            .filter(sync_status::Column::Network.eq(network.as_str()))
            .one(&self.conn)
            .await?;

        result.map(to_domain).transpose()
    }

    async fn list_statuses(&self) -> Result<Vec<SyncStatus>, DbError> {
        let rows = sync_status::Entity::find()
            .order_by_asc(sync_status::Column::Network)
            .all(&self.conn)
            .await?;

        rows.into_iter().map(to_domain).collect()
    }
}
