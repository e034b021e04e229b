//! Wire records returned by the stake subgraph
//!
//! The Graph serialises `BigInt` and `BigDecimal` as JSON strings, but some deployments
//! return plain numbers for `Int` fields, so every numeric field accepts both. Fields
//! not listed here are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::config::Network;
use crate::domain::models::stake::shares_to_tshares;
use crate::domain::models::{GlobalInfo, StakeEnd, StakeStart};
use crate::infrastructure::subgraph::error::SubgraphClientError;

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlErrorMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeStartsData {
    pub stake_starts: Vec<StakeStartRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeEndsData {
    pub stake_ends: Vec<StakeEndRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalInfosData {
    pub global_infos: Vec<GlobalInfoRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeStartRecord {
    #[serde(deserialize_with = "de_string")]
    pub stake_id: String,
    pub staker_addr: String,
    #[serde(deserialize_with = "de_string")]
    pub staked_hearts: String,
    #[serde(deserialize_with = "de_string")]
    pub stake_shares: String,
    #[serde(deserialize_with = "de_string")]
    pub staked_days: String,
    #[serde(deserialize_with = "de_string")]
    pub start_day: String,
    #[serde(deserialize_with = "de_string")]
    pub end_day: String,
    #[serde(deserialize_with = "de_string")]
    pub timestamp: String,
    #[serde(default)]
    pub is_auto_stake: Option<bool>,
    pub transaction_hash: String,
    #[serde(deserialize_with = "de_string")]
    pub block_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeEndRecord {
    #[serde(deserialize_with = "de_string")]
    pub stake_id: String,
    pub staker_addr: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub payout: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub penalty: Option<String>,
    #[serde(deserialize_with = "de_string")]
    pub served_days: String,
    #[serde(deserialize_with = "de_string")]
    pub timestamp: String,
    pub transaction_hash: String,
    #[serde(deserialize_with = "de_string")]
    pub block_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalInfoRecord {
    #[serde(deserialize_with = "de_string")]
    pub hex_day: String,
    #[serde(deserialize_with = "de_string")]
    pub stake_shares_total: String,
    #[serde(deserialize_with = "de_string")]
    pub stake_penalty_total: String,
    #[serde(deserialize_with = "de_string")]
    pub locked_hearts_total: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub share_rate: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub latest_stake_id: Option<String>,
    #[serde(deserialize_with = "de_string")]
    pub timestamp: String,
    #[serde(default, alias = "blockNumber", deserialize_with = "de_opt_string")]
    pub blocknumber: Option<String>,
}

impl StakeStartRecord {
    pub fn into_domain(self, network: Network) -> Result<StakeStart, SubgraphClientError> {
        let stake_t_shares = shares_to_tshares(&self.stake_shares);

        Ok(StakeStart {
            staked_days: parse_int("stakedDays", &self.staked_days)?,
            start_day: parse_int("startDay", &self.start_day)?,
            end_day: parse_int("endDay", &self.end_day)?,
            timestamp: parse_int("timestamp", &self.timestamp)?,
            block_number: parse_int("blockNumber", &self.block_number)?,
            stake_id: self.stake_id,
            network,
            staker_address: normalize_address(&self.staker_addr),
            staked_amount: self.staked_hearts,
            stake_shares: self.stake_shares,
            stake_t_shares,
            is_auto_stake: self.is_auto_stake.unwrap_or(false),
            transaction_hash: self.transaction_hash.to_ascii_lowercase(),
        })
    }
}

impl StakeEndRecord {
    pub fn into_domain(self, network: Network) -> Result<StakeEnd, SubgraphClientError> {
        Ok(StakeEnd {
            served_days: parse_int("servedDays", &self.served_days)?,
            timestamp: parse_int("timestamp", &self.timestamp)?,
            block_number: parse_int("blockNumber", &self.block_number)?,
            stake_id: self.stake_id,
            network,
            staker_address: normalize_address(&self.staker_addr),
            payout: self.payout.unwrap_or_else(|| "0".to_string()),
            penalty: self.penalty.unwrap_or_else(|| "0".to_string()),
            transaction_hash: self.transaction_hash.to_ascii_lowercase(),
        })
    }
}

impl GlobalInfoRecord {
    pub fn into_domain(self, network: Network) -> Result<GlobalInfo, SubgraphClientError> {
        let block_number = match self.blocknumber {
            Some(ref value) => Some(parse_int("blocknumber", value)?),
            None => None,
        };

        Ok(GlobalInfo {
            network,
            hex_day: parse_int("hexDay", &self.hex_day)?,
            stake_shares_total: self.stake_shares_total,
            stake_penalty_total: self.stake_penalty_total,
            locked_hearts_total: self.locked_hearts_total,
            share_rate: self.share_rate,
            latest_stake_id: self.latest_stake_id,
            timestamp: parse_int("timestamp", &self.timestamp)?,
            block_number,
        })
    }
}

fn parse_int<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, SubgraphClientError> {
    value.trim().parse::<T>().map_err(|_| {
        SubgraphClientError::MalformedResponse(format!(
            "field {} has non-integer value '{}'",
            field, value
        ))
    })
}

fn normalize_address(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

fn value_to_string<E: serde::de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!(
            "expected string or number, found {}",
            other
        ))),
    }
}

fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_string(Value::deserialize(deserializer)?)
}

fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value_to_string(value).map(Some),
    }
}
