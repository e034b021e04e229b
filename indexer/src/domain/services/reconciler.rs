//! Active-stake reconciliation
//!
//! A stake is active exactly when no `StakeEnd` with the same network-local ID exists.
//! `end_day` passing is not treated as closure: stakes can stay open on-chain past it.

use std::collections::HashSet;

use crate::config::Network;
use crate::domain::errors::ReconcileError;
use crate::domain::models::{ActiveStake, StakeEnd, StakeStart};

/// Output of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciliation {
    /// Active stakes in input order, derived fields populated
    pub active: Vec<ActiveStake>,
    /// Number of starts closed by a matching end
    pub ended: usize,
    /// Ends whose start was not in the input (e.g. the start fetch hit its ceiling)
    pub orphaned_ends: usize,
    /// Starts dropped because the same stake ID appeared earlier in the input
    pub duplicate_starts: usize,
}

/// Derive the active subset of `starts` and compute its day-relative fields
///
/// Pure: inputs are not touched and the same inputs always give the same output.
pub fn reconcile(
    starts: &[StakeStart],
    ends: &[StakeEnd],
    current_day: i32,
) -> Result<Reconciliation, ReconcileError> {
    check_single_network(starts, ends)?;

    let ended_ids: HashSet<&str> = ends.iter().map(|e| e.stake_id.as_str()).collect();

    let mut seen: HashSet<&str> = HashSet::with_capacity(starts.len());
    let mut reconciliation = Reconciliation::default();
    let mut matched_ends: HashSet<&str> = HashSet::new();

    for start in starts {
        if !seen.insert(start.stake_id.as_str()) {
            reconciliation.duplicate_starts += 1;
            continue;
        }

        if ended_ids.contains(start.stake_id.as_str()) {
            matched_ends.insert(start.stake_id.as_str());
            reconciliation.ended += 1;
            continue;
        }

        reconciliation.active.push(ActiveStake {
            start: start.clone(),
            is_active: true,
            days_served: days_served(start.start_day, current_day),
            days_left: days_left(start.end_day, current_day),
        });
    }

    reconciliation.orphaned_ends = ended_ids.len() - matched_ends.len();

    Ok(reconciliation)
}

/// `max(0, current_day - start_day)`
pub fn days_served(start_day: i32, current_day: i32) -> i32 {
    current_day.saturating_sub(start_day).max(0)
}

/// `max(0, end_day - current_day)`
pub fn days_left(end_day: i32, current_day: i32) -> i32 {
    end_day.saturating_sub(current_day).max(0)
}

fn check_single_network(starts: &[StakeStart], ends: &[StakeEnd]) -> Result<(), ReconcileError> {
    let expected: Option<Network> = starts
        .first()
        .map(|s| s.network)
        .or_else(|| ends.first().map(|e| e.network));

    let Some(expected) = expected else {
        return Ok(());
    };

    let starts_iter = starts.iter().map(|s| (s.network, &s.stake_id));
    let ends_iter = ends.iter().map(|e| (e.network, &e.stake_id));

    for (found, stake_id) in starts_iter.chain(ends_iter) {
        if found != expected {
            return Err(ReconcileError::NetworkMismatch {
                expected,
                found,
                stake_id: stake_id.clone(),
            });
        }
    }

    Ok(())
}
