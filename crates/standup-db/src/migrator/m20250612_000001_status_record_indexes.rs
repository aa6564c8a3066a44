//! Migration enforcing one status record per (user, team, date)
//! and indexing the columns report queries filter on

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Upserts target this index with ON CONFLICT
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_status_records_user_team_date")
                    .table(StatusRecords::Table)
                    .col(StatusRecords::UserId)
                    .col(StatusRecords::TeamId)
                    .col(StatusRecords::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_status_records_date")
                    .table(StatusRecords::Table)
                    .col(StatusRecords::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_status_records_team_id")
                    .table(StatusRecords::Table)
                    .col(StatusRecords::TeamId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_status_records_team_id",
            "idx_status_records_date",
            "idx_status_records_user_team_date",
        ] {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(StatusRecords::Table)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum StatusRecords {
    Table,
    UserId,
    TeamId,
    Date,
}
