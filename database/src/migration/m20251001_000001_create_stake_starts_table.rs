use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Active stakes; persisted_stake_id is "{network}:{stake_id}"
        manager
            .create_table(
                Table::create()
                    .table(StakeStarts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StakeStarts::PersistedStakeId).text().not_null())
                    .col(ColumnDef::new(StakeStarts::Network).text().not_null())
                    .col(ColumnDef::new(StakeStarts::StakeId).text().not_null())
                    .col(ColumnDef::new(StakeStarts::StakerAddress).text().not_null())
                    .col(ColumnDef::new(StakeStarts::StakedAmount).text().not_null())
                    .col(ColumnDef::new(StakeStarts::StakeShares).text().not_null())
                    .col(ColumnDef::new(StakeStarts::StakeTShares).text().not_null())
                    .col(ColumnDef::new(StakeStarts::StakedDays).integer().not_null())
                    .col(ColumnDef::new(StakeStarts::StartDay).integer().not_null())
                    .col(ColumnDef::new(StakeStarts::EndDay).integer().not_null())
                    .col(ColumnDef::new(StakeStarts::Timestamp).big_integer().not_null())
                    .col(ColumnDef::new(StakeStarts::IsAutoStake).boolean().not_null().default(false))
                    .col(ColumnDef::new(StakeStarts::TransactionHash).text().not_null())
                    .col(ColumnDef::new(StakeStarts::BlockNumber).big_integer().not_null())
                    .col(ColumnDef::new(StakeStarts::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(StakeStarts::DaysServed).integer().not_null().default(0))
                    .col(ColumnDef::new(StakeStarts::DaysLeft).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(StakeStarts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(StakeStarts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(StakeStarts::PersistedStakeId)
                            .col(StakeStarts::Network),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stake_starts_network_active")
                    .table(StakeStarts::Table)
                    .col(StakeStarts::Network)
                    .col(StakeStarts::IsActive)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stake_starts_staker_address")
                    .table(StakeStarts::Table)
                    .col(StakeStarts::StakerAddress)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StakeStarts::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum StakeStarts {
    Table,
    PersistedStakeId,
    Network,
    StakeId,
    StakerAddress,
    StakedAmount,
    StakeShares,
    StakeTShares,
    StakedDays,
    StartDay,
    EndDay,
    Timestamp,
    IsAutoStake,
    TransactionHash,
    BlockNumber,
    IsActive,
    DaysServed,
    DaysLeft,
    CreatedAt,
    UpdatedAt,
}
