//! SeaORM Entity for sync_status table
//! One row per network

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_status")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub network: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub last_synced_id: Option<String>,
    pub last_synced_block: Option<i64>,
    pub total_stakes_synced: i64,
    pub sync_in_progress: bool,
    #[sea_orm(column_type = "TimestampWithTimeZone", nullable)]
    pub last_sync_started_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "TimestampWithTimeZone", nullable)]
    pub last_sync_completed_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
