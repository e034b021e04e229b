pub mod global_info;
pub mod stake_starts;
pub mod sync_status;
