//! Stake sync pipeline
//!
//! `NetworkManager` serialises runs per network and fans out across networks;
//! `SyncOrchestrator` drives one run through its states.

pub mod batch_processor;
pub mod network_manager;
pub mod orchestrator;
pub mod report;
pub mod state;

pub use batch_processor::{BatchOutcome, BatchWriter, ChunkFailure};
pub use network_manager::NetworkManager;
pub use orchestrator::SyncOrchestrator;
pub use report::{OperationLog, SyncReport};
pub use state::{SyncMode, SyncState};
