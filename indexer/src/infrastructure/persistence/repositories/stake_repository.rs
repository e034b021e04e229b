//! Repository for stake_starts operations

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, Set, Statement, Value,
};
use std::fmt;

use crate::config::Network;
use crate::domain::models::ActiveStake;
use crate::domain::ports::StakeStore;
use crate::infrastructure::persistence::entities::stake_starts;
use crate::infrastructure::persistence::error::DbError;

const REFRESH_DERIVED_FIELDS_SQL: &str = r#"
    UPDATE stake_starts
    SET days_served = GREATEST(0, $1 - start_day),
        days_left = GREATEST(0, end_day - $1),
        updated_at = CURRENT_TIMESTAMP
    WHERE network = $2
"#;

/// Repository for persisted active stakes
#[derive(Clone)]
pub struct StakeRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for StakeRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StakeRepository").finish_non_exhaustive()
    }
}

impl StakeRepository {
    /// Create a new StakeRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

/// Map a stake to the row it is persisted as
pub fn to_active_model(stake: &ActiveStake) -> stake_starts::ActiveModel {
    let now = Utc::now();
    let start = &stake.start;

    stake_starts::ActiveModel {
        persisted_stake_id: Set(stake.persisted_stake_id()),
        network: Set(start.network.as_str().to_string()),
        stake_id: Set(start.stake_id.clone()),
        staker_address: Set(start.staker_address.clone()),
        staked_amount: Set(start.staked_amount.clone()),
        stake_shares: Set(start.stake_shares.clone()),
        stake_t_shares: Set(start.stake_t_shares.clone()),
        staked_days: Set(start.staked_days),
        start_day: Set(start.start_day),
        end_day: Set(start.end_day),
        timestamp: Set(start.timestamp),
        is_auto_stake: Set(start.is_auto_stake),
        transaction_hash: Set(start.transaction_hash.clone()),
        block_number: Set(start.block_number),
        is_active: Set(stake.is_active),
        days_served: Set(stake.days_served),
        days_left: Set(stake.days_left),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

#[async_trait]
impl StakeStore for StakeRepository {
    async fn upsert_stake_chunk(&self, chunk: &[ActiveStake]) -> Result<u64, DbError> {
        if chunk.is_empty() {
            return Ok(0);
        }

        // Immutable event columns are never overwritten on conflict
        let rows = stake_starts::Entity::insert_many(chunk.iter().map(to_active_model))
            .on_conflict(
                OnConflict::columns([
                    stake_starts::Column::PersistedStakeId,
                    stake_starts::Column::Network,
                ])
                .update_columns([
                    stake_starts::Column::IsActive,
                    stake_starts::Column::DaysServed,
                    stake_starts::Column::DaysLeft,
                    stake_starts::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(rows)
    }

    async fn delete_network_stakes(&self, network: Network) -> Result<u64, DbError> {
        let result = stake_starts::Entity::delete_many()
            .filter(stake_starts::Column::Network.eq(network.as_str()))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    async fn delete_stakes(
        &self,
        network: Network,
        persisted_stake_ids: &[String],
    ) -> Result<u64, DbError> {
        if persisted_stake_ids.is_empty() {
            return Ok(0);
        }

        let result = stake_starts::Entity::delete_many()
            .filter(stake_starts::Column::Network.eq(network.as_str()))
            .filter(stake_starts::Column::PersistedStakeId.is_in(persisted_stake_ids.iter().cloned()))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    async fn refresh_derived_fields(
        &self,
        network: Network,
        current_day: i32,
    ) -> Result<u64, DbError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            REFRESH_DERIVED_FIELDS_SQL,
            [Value::from(current_day), Value::from(network.as_str())],
        );

        let result = self.conn.execute(stmt).await?;
        Ok(result.rows_affected())
    }

    async fn count_active(&self, network: Network) -> Result<u64, DbError> {
        let count = stake_starts::Entity::find()
            .filter(stake_starts::Column::Network.eq(network.as_str()))
            .filter(stake_starts::Column::IsActive.eq(true))
            .count(&self.conn)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::StakeStart;

    fn stake(network: Network, id: &str) -> ActiveStake {
        ActiveStake {
            start: StakeStart {
                stake_id: id.to_string(),
                network,
                staker_address: "0xaa".to_string(),
                staked_amount: "1".to_string(),
                stake_shares: "2".to_string(),
                stake_t_shares: "0.000000000002".to_string(),
                staked_days: 30,
                start_day: 10,
                end_day: 40,
                timestamp: 1,
                is_auto_stake: false,
                transaction_hash: "0x1".to_string(),
                block_number: 5,
            },
            is_active: true,
            days_served: 3,
            days_left: 27,
        }
    }

    #[test]
    fn test_row_keeps_raw_id_and_namespaced_key() {
        let row = to_active_model(&stake(Network::Pulsechain, "12"));

        assert_eq!(row.persisted_stake_id.unwrap(), "pulsechain:12");
        assert_eq!(row.stake_id.unwrap(), "12");
        assert_eq!(row.network.unwrap(), "pulsechain");
        assert_eq!(row.days_left.unwrap(), 27);
    }

    #[test]
    fn test_same_raw_id_gives_distinct_rows_per_network() {
        let eth = to_active_model(&stake(Network::Ethereum, "7"));
        let pls = to_active_model(&stake(Network::Pulsechain, "7"));

        assert_ne!(eth.persisted_stake_id.unwrap(), pls.persisted_stake_id.unwrap());
    }
}
