use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per network and day
        manager
            .create_table(
                Table::create()
                    .table(GlobalInfo::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GlobalInfo::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(GlobalInfo::Network).text().not_null())
                    .col(ColumnDef::new(GlobalInfo::HexDay).integer().not_null())
                    .col(ColumnDef::new(GlobalInfo::StakeSharesTotal).text().not_null())
                    .col(ColumnDef::new(GlobalInfo::StakePenaltyTotal).text().not_null())
                    .col(ColumnDef::new(GlobalInfo::LockedHeartsTotal).text().not_null())
                    .col(ColumnDef::new(GlobalInfo::ShareRate).text().null())
                    .col(ColumnDef::new(GlobalInfo::LatestStakeId).text().null())
                    .col(ColumnDef::new(GlobalInfo::Timestamp).big_integer().not_null())
                    .col(ColumnDef::new(GlobalInfo::BlockNumber).big_integer().null())
                    .col(
                        ColumnDef::new(GlobalInfo::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GlobalInfo::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Upsert target
        manager
            .create_index(
                Index::create()
                    .name("idx_global_info_network_day")
                    .table(GlobalInfo::Table)
                    .col(GlobalInfo::Network)
                    .col(GlobalInfo::HexDay)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GlobalInfo::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum GlobalInfo {
    Table,
    Id,
    Network,
    HexDay,
    StakeSharesTotal,
    StakePenaltyTotal,
    LockedHeartsTotal,
    ShareRate,
    LatestStakeId,
    Timestamp,
    BlockNumber,
    CreatedAt,
    UpdatedAt,
}
