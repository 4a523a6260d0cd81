use sea_orm_migration::prelude::*;

use crate::join_table::join_table;
use crate::m20261001_000001_accounts::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tags::Title).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Zones::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Zones::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Zones::City).string().not_null())
                    .col(ColumnDef::new(Zones::LocalNameOfCity).string().not_null())
                    .col(ColumnDef::new(Zones::Province).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_zones_city_province")
                    .table(Zones::Table)
                    .col(Zones::City)
                    .col(Zones::Province)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(join_table(
                AccountTags::Table,
                (AccountTags::AccountId, Accounts::Table),
                (AccountTags::TagId, Tags::Table),
            ))
            .await?;

        manager
            .create_table(join_table(
                AccountZones::Table,
                (AccountZones::AccountId, Accounts::Table),
                (AccountZones::ZoneId, Zones::Table),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountZones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountTags::Table).to_owned())
            .await?;

        let _ = manager
            .drop_index(Index::drop().name("idx_zones_city_province").to_owned())
            .await;

        manager
            .drop_table(Table::drop().table(Zones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Tags {
    Table,
    Id,
    Title,
}

#[derive(DeriveIden)]
pub(crate) enum Zones {
    Table,
    Id,
    City,
    LocalNameOfCity,
    Province,
}

#[derive(DeriveIden)]
enum AccountTags {
    Table,
    AccountId,
    TagId,
}

#[derive(DeriveIden)]
enum AccountZones {
    Table,
    AccountId,
    ZoneId,
}
