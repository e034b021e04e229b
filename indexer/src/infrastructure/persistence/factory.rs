use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    GlobalInfoRepository, Repositories, StakeRepository, SyncStatusRepository,
};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all repositories
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(
            Self::create_stake_repository(conn.clone()),
            Self::create_global_info_repository(conn.clone()),
            Self::create_sync_status_repository(conn),
        )
    }

    /// Create a stake repository
    pub fn create_stake_repository(conn: DatabaseConnection) -> StakeRepository {
        StakeRepository::new(conn)
    }

    /// Create a global_info repository
    pub fn create_global_info_repository(conn: DatabaseConnection) -> GlobalInfoRepository {
        GlobalInfoRepository::new(conn)
    }

    /// Create a sync_status repository
    pub fn create_sync_status_repository(conn: DatabaseConnection) -> SyncStatusRepository {
        SyncStatusRepository::new(conn)
    }
}
