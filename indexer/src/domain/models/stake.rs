use serde::{Deserialize, Serialize};

use crate::config::Network;
use crate::domain::services::namespacing;

/// A staking position opened on a network (immutable fact)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeStart {
    /// Network-local stake identifier (not unique across networks)
    pub stake_id: String,
    pub network: Network,
    /// Lowercase 0x-prefixed address
    pub staker_address: String,
    /// Decimal string, arbitrary precision
    pub staked_amount: String,
    /// Decimal string, arbitrary precision
    pub stake_shares: String,
    /// Decimal string, arbitrary precision
    pub stake_t_shares: String,
    pub staked_days: i32,
    pub start_day: i32,
    pub end_day: i32,
    /// Unix epoch seconds of the emitting block
    pub timestamp: i64,
    pub is_auto_stake: bool,
    pub transaction_hash: String,
    pub block_number: i64,
}

/// Closes exactly one `StakeStart` with the same `(stake_id, network)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeEnd {
    pub stake_id: String,
    pub network: Network,
    pub staker_address: String,
    pub payout: String,
    pub penalty: String,
    pub served_days: i32,
    pub timestamp: i64,
    pub transaction_hash: String,
    pub block_number: i64,
}

/// A `StakeStart` with no matching `StakeEnd`, plus the fields derived from the current day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStake {
    pub start: StakeStart,
    pub is_active: bool,
    pub days_served: i32,
    pub days_left: i32,
}

impl ActiveStake {
    /// Globally unique key this stake is persisted under
    pub fn persisted_stake_id(&self) -> String {
        namespacing::namespaced_key(self.start.network, &self.start.stake_id)
    }

    pub fn network(&self) -> Network {
        self.start.network
    }
}

impl StakeEnd {
    /// Key of the persisted stake this event closes
    pub fn persisted_stake_id(&self) -> String {
        namespacing::namespaced_key(self.network, &self.stake_id)
    }
}

/// Shift a share count down by 10^12 to express it in T-shares, preserving every digit
///
/// Used when the upstream payload has no `stakeTShares` field.
pub fn shares_to_tshares(shares: &str) -> String {
    const SCALE: usize = 12;

    let digits = shares.trim().trim_start_matches('0');
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return "0".to_string();
    }

    let (whole, fraction) = if digits.len() > SCALE {
        let split = digits.len() - SCALE;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = SCALE))
    };

    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_to_tshares() {
        assert_eq!(shares_to_tshares("1000000000000"), "1");
        assert_eq!(shares_to_tshares("2500000000000"), "2.5");
        assert_eq!(shares_to_tshares("123"), "0.000000000123");
        assert_eq!(shares_to_tshares("0"), "0");
        assert_eq!(shares_to_tshares("12345678901234567890"), "12345678.90123456789");
        assert_eq!(shares_to_tshares("not a number"), "0");
    }
}
