//! Repository for global_info operations

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, QueryOrder, Set,
};
use std::fmt;

use crate::config::Network;
use crate::domain::models::GlobalInfo;
use crate::domain::ports::GlobalInfoStore;
use crate::infrastructure::persistence::entities::global_info;
use crate::infrastructure::persistence::error::DbError;

/// Repository for daily global records
#[derive(Clone)]
pub struct GlobalInfoRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for GlobalInfoRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalInfoRepository").finish_non_exhaustive()
    }
}

impl GlobalInfoRepository {
    /// Create a new GlobalInfoRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

fn to_domain(model: global_info::Model) -> Result<GlobalInfo, DbError> {
    let network: Network = model
        .network
        .parse()
        .map_err(|e| DbError::Other(format!("global_info row {}: {}", model.id, e)))?;

    Ok(GlobalInfo {
        network,
        hex_day: model.hex_day,
        stake_shares_total: model.stake_shares_total,
        stake_penalty_total: model.stake_penalty_total,
        locked_hearts_total: model.locked_hearts_total,
        share_rate: model.share_rate,
        latest_stake_id: model.latest_stake_id,
        timestamp: model.timestamp,
        block_number: model.block_number,
    })
}

#[async_trait]
impl GlobalInfoStore for GlobalInfoRepository {
    async fn upsert_global_info(&self, info: &GlobalInfo) -> Result<(), DbError> {
        let now = Utc::now();

        let row = global_info::ActiveModel {
            id: NotSet,
            network: Set(info.network.as_str().to_string()),
            hex_day: Set(info.hex_day),
            stake_shares_total: Set(info.stake_shares_total.clone()),
            stake_penalty_total: Set(info.stake_penalty_total.clone()),
            locked_hearts_total: Set(info.locked_hearts_total.clone()),
            share_rate: Set(info.share_rate.clone()),
            latest_stake_id: Set(info.latest_stake_id.clone()),
            timestamp: Set(info.timestamp),
            block_number: Set(info.block_number),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        global_info::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([global_info::Column::Network, global_info::Column::HexDay])
                    .update_columns([
                        global_info::Column::StakeSharesTotal,
                        global_info::Column::StakePenaltyTotal,
                        global_info::Column::LockedHeartsTotal,
                        global_info::Column::ShareRate,
                        global_info::Column::LatestStakeId,
                        global_info::Column::Timestamp,
                        global_info::Column::BlockNumber,
                        global_info::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    async fn latest_global_info(&self, network: Network) -> Result<Option<GlobalInfo>, DbError> {
        let result = global_info::Entity::find()
            .filter(global_info::Column::Network.eq(network.as_str()))
            .order_by_desc(global_info::Column::HexDay)
            .one(&self.conn)
            .await?;

        result.map(to_domain).transpose()
    }
}
