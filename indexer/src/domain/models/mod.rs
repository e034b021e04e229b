pub mod global_info;
pub mod stake;
pub mod sync_status;

pub use global_info::GlobalInfo;
pub use stake::{ActiveStake, StakeEnd, StakeStart};
pub use sync_status::{SyncStatus, SyncSummary};
