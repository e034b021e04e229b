//! SeaORM Entity for global_info table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "global_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub network: String,
    pub hex_day: i32,
    #[sea_orm(column_type = "Text")]
    pub stake_shares_total: String,
    #[sea_orm(column_type = "Text")]
    pub stake_penalty_total: String,
    #[sea_orm(column_type = "Text")]
    pub locked_hearts_total: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub share_rate: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub latest_stake_id: Option<String>,
    pub timestamp: i64,
    pub block_number: Option<i64>,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
