//! Sync run lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::SyncError;

/// How a run applies upstream events to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Refetch everything and replace the network's snapshot
    Full,
    /// Fetch only events past the stored cursor
    Incremental,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Full => "full",
            SyncMode::Incremental => "incremental",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "resync" => Ok(SyncMode::Full),
            "incremental" | "sync" => Ok(SyncMode::Incremental),
            other => Err(format!("unknown sync mode '{}'", other)),
        }
    }
}

/// States of one sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Fetching,
    Reconciling,
    Persisting,
    Completed,
    Failed,
}

impl SyncState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncState::Completed | SyncState::Failed)
    }

    /// Forward edges of the lifecycle, plus any non-terminal state to `Failed`
    pub fn can_transition_to(&self, next: SyncState) -> bool {
        use SyncState::*;

        match (self, next) {
            (Idle, Fetching)
            | (Fetching, Reconciling)
            | (Reconciling, Persisting)
            | (Persisting, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::Fetching => "fetching",
            SyncState::Reconciling => "reconciling",
            SyncState::Persisting => "persisting",
            SyncState::Completed => "completed",
            SyncState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Current state of a run, rejecting edges the lifecycle does not have
#[derive(Debug, Clone)]
pub struct SyncStateMachine {
    state: SyncState,
}

impl SyncStateMachine {
    pub fn new() -> Self {
        Self {
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn transition(&mut self, next: SyncState) -> Result<(), SyncError> {
        if !self.state.can_transition_to(next) {
            return Err(SyncError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }
}

impl Default for SyncStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
