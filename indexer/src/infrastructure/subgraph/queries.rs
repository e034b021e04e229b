//! GraphQL documents sent to the stake subgraph

use serde_json::{json, Value};

use crate::infrastructure::subgraph::pagination::EventFilter;

pub const STAKE_STARTS_QUERY: &str = r#"
query StakeStarts($first: Int!, $skip: Int!, $where: StakeStart_filter) {
  stakeStarts(first: $first, skip: $skip, orderBy: stakeId, orderDirection: asc, where: $where) {
    stakeId
    stakerAddr
    stakedHearts
    stakeShares
    stakedDays
    startDay
    endDay
    timestamp
    isAutoStake
    transactionHash
    blockNumber
  }
}
"#;

pub const STAKE_ENDS_QUERY: &str = r#"
query StakeEnds($first: Int!, $skip: Int!, $where: StakeEnd_filter) {
  stakeEnds(first: $first, skip: $skip, orderBy: stakeId, orderDirection: asc, where: $where) {
    stakeId
    stakerAddr
    payout
    penalty
    servedDays
    timestamp
    transactionHash
    blockNumber
  }
}
"#;

pub const GLOBAL_INFO_QUERY: &str = r#"
query LatestGlobalInfo {
  globalInfos(first: 1, orderBy: timestamp, orderDirection: desc) {
    hexDay
    stakeSharesTotal
    stakePenaltyTotal
    lockedHeartsTotal
    shareRate
    latestStakeId
    timestamp
    blocknumber
  }
}
"#;

/// Variables for one page of a stake event collection
pub fn page_variables(first: usize, skip: usize, filter: &EventFilter) -> Value {
    json!({
        "first": first,
        "skip": skip,
        "where": filter_clause(filter),
    })
}

/// `where` argument for a filter; BigInt cursors go over the wire as strings
pub fn filter_clause(filter: &EventFilter) -> Value {
    match filter {
        EventFilter::All => json!({}),
        EventFilter::StakeIdAfter(stake_id) => json!({ "stakeId_gt": stake_id }),
        EventFilter::BlockAfter(block) => json!({ "blockNumber_gt": block.to_string() }),
    }
}
