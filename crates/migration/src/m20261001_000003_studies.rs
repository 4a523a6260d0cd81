use sea_orm_migration::prelude::*;

use crate::join_table::join_table;
use crate::m20261001_000001_accounts::Accounts;
use crate::m20261001_000002_tags_and_zones::{Tags, Zones};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Studies::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Studies::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Studies::Path).string().not_null().unique_key())
                    .col(ColumnDef::new(Studies::Title).string().not_null())
                    .col(ColumnDef::new(Studies::ShortDescription).string().not_null())
                    .col(ColumnDef::new(Studies::FullDescription).text().not_null())
                    .col(ColumnDef::new(Studies::Image).text())
                    .col(ColumnDef::new(Studies::UseBanner).boolean().not_null().default(false))
                    .col(ColumnDef::new(Studies::Published).boolean().not_null().default(false))
                    .col(ColumnDef::new(Studies::PublishedAt).big_integer())
                    .col(ColumnDef::new(Studies::Closed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Studies::ClosedAt).big_integer())
                    .col(ColumnDef::new(Studies::Recruiting).boolean().not_null().default(false))
                    .col(ColumnDef::new(Studies::RecruitingUpdatedAt).big_integer())
                    .col(ColumnDef::new(Studies::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Studies::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Managers and members are two separate account <-> study relations.
        manager
            .create_table(join_table(
                StudyManagers::Table,
                (StudyManagers::StudyId, Studies::Table),
                (StudyManagers::AccountId, Accounts::Table),
            ))
            .await?;
        manager
            .create_table(join_table(
                StudyMembers::Table,
                (StudyMembers::StudyId, Studies::Table),
                (StudyMembers::AccountId, Accounts::Table),
            ))
            .await?;
        manager
            .create_table(join_table(
                StudyTags::Table,
                (StudyTags::StudyId, Studies::Table),
                (StudyTags::TagId, Tags::Table),
            ))
            .await?;
        manager
            .create_table(join_table(
                StudyZones::Table,
                (StudyZones::StudyId, Studies::Table),
                (StudyZones::ZoneId, Zones::Table),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            StudyZones::Table.into_iden(),
            StudyTags::Table.into_iden(),
            StudyMembers::Table.into_iden(),
            StudyManagers::Table.into_iden(),
            Studies::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Studies {
    Table,
    Id,
    Path,
    Title,
    ShortDescription,
    FullDescription,
    Image,
    UseBanner,
    Published,
    PublishedAt,
    Closed,
    ClosedAt,
    Recruiting,
    RecruitingUpdatedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudyManagers {
    Table,
    StudyId,
    AccountId,
}

#[derive(DeriveIden)]
enum StudyMembers {
    Table,
    StudyId,
    AccountId,
}

#[derive(DeriveIden)]
enum StudyTags {
    Table,
    StudyId,
    TagId,
}

#[derive(DeriveIden)]
enum StudyZones {
    Table,
    StudyId,
    ZoneId,
}
