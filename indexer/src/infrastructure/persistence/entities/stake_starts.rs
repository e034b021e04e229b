//! SeaORM Entity for stake_starts table
//! Active stakes, one row per (persisted_stake_id, network)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stake_starts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub persisted_stake_id: String,
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub network: String,
    #[sea_orm(column_type = "Text")]
    pub stake_id: String,
    #[sea_orm(column_type = "Text")]
    pub staker_address: String,
    #[sea_orm(column_type = "Text")]
    pub staked_amount: String,
    #[sea_orm(column_type = "Text")]
    pub stake_shares: String,
    #[sea_orm(column_type = "Text")]
    pub stake_t_shares: String,
    pub staked_days: i32,
    pub start_day: i32,
    pub end_day: i32,
    pub timestamp: i64,
    pub is_auto_stake: bool,
    #[sea_orm(column_type = "Text")]
    pub transaction_hash: String,
    pub block_number: i64,
    pub is_active: bool,
    pub days_served: i32,
    pub days_left: i32,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
