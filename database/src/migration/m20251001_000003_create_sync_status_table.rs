use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const NETWORKS: [&str; 2] = ["ethereum", "pulsechain"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncStatus::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SyncStatus::Network).text().not_null().primary_key())
                    .col(ColumnDef::new(SyncStatus::LastSyncedId).text().null())
                    .col(ColumnDef::new(SyncStatus::LastSyncedBlock).big_integer().null())
                    .col(ColumnDef::new(SyncStatus::TotalStakesSynced).big_integer().not_null().default(0))
                    .col(ColumnDef::new(SyncStatus::SyncInProgress).boolean().not_null().default(false))
                    .col(ColumnDef::new(SyncStatus::LastSyncStartedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(SyncStatus::LastSyncCompletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(SyncStatus::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(SyncStatus::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Seed one row per network using INSERT ... ON CONFLICT DO NOTHING
        for network in NETWORKS {
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "INSERT INTO sync_status (network, updated_at) \
                     VALUES ('{}', NOW()) \
                     ON CONFLICT (network) DO NOTHING;",
                    network
                ))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncStatus::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum SyncStatus {
    Table,
    Network,
    LastSyncedId,
    LastSyncedBlock,
    TotalStakesSynced,
    SyncInProgress,
    LastSyncStartedAt,
    LastSyncCompletedAt,
    ErrorMessage,
    UpdatedAt,
}
