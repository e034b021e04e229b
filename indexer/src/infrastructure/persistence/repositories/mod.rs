pub mod global_info_repository;
pub mod stake_repository;
pub mod sync_status_repository;

pub use global_info_repository::GlobalInfoRepository;
pub use stake_repository::StakeRepository;
pub use sync_status_repository::SyncStatusRepository;

/// Collection of all repositories
#[derive(Clone, Debug)]
pub struct Repositories {
    /// Repository for active stake rows
    pub stake: StakeRepository,
    /// Repository for daily global records
    pub global_info: GlobalInfoRepository,
    /// Repository for sync bookkeeping
    pub sync_status: SyncStatusRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(
        stake: StakeRepository,
        global_info: GlobalInfoRepository,
        sync_status: SyncStatusRepository,
    ) -> Self {
        Self {
            stake,
            global_info,
            sync_status,
        }
    }
}
