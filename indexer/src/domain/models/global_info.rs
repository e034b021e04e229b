use serde::{Deserialize, Serialize};

use crate::config::Network;

/// Daily aggregate totals for a network, carrying the authoritative current day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalInfo {
    pub network: Network,
    /// Day index the record was taken on; also the network's current day
    pub hex_day: i32,
    pub stake_shares_total: String,
    pub stake_penalty_total: String,
    pub locked_hearts_total: String,
    pub share_rate: Option<String>,
    pub latest_stake_id: Option<String>,
    pub timestamp: i64,
    pub block_number: Option<i64>,
}

impl GlobalInfo {
    /// Day cursor used for `days_served` / `days_left`
    pub fn current_day(&self) -> i32 {
        self.hex_day
    }
}
