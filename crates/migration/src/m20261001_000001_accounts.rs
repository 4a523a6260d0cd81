use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Accounts::Nickname).string().not_null().unique_key())
                    .col(ColumnDef::new(Accounts::PasswordHash).binary().not_null())
                    .col(ColumnDef::new(Accounts::Salt).binary().not_null())
                    .col(
                        ColumnDef::new(Accounts::PasswordIterations)
                            .integer()
                            .not_null()
                            .default(100_000),
                    )
                    .col(
                        ColumnDef::new(Accounts::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Accounts::EmailCheckToken).string())
                    .col(ColumnDef::new(Accounts::EmailCheckTokenGeneratedAt).big_integer())
                    .col(ColumnDef::new(Accounts::JoinedAt).big_integer())
                    .col(ColumnDef::new(Accounts::Bio).string())
                    .col(ColumnDef::new(Accounts::Url).string())
                    .col(ColumnDef::new(Accounts::Occupation).string())
                    .col(ColumnDef::new(Accounts::Location).string())
                    .col(ColumnDef::new(Accounts::ProfileImage).text())
                    .col(notification_flag(Accounts::StudyCreatedByEmail, false))
                    .col(notification_flag(Accounts::StudyCreatedByWeb, true))
                    .col(notification_flag(Accounts::StudyEnrollmentResultByEmail, false))
                    .col(notification_flag(Accounts::StudyEnrollmentResultByWeb, true))
                    .col(notification_flag(Accounts::StudyUpdatedByEmail, false))
                    .col(notification_flag(Accounts::StudyUpdatedByWeb, true))
                    .col(ColumnDef::new(Accounts::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Accounts::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sessions::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Sessions::AccountId).string().not_null())
                    .col(ColumnDef::new(Sessions::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Sessions::ExpiresAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_account_id")
                            .from(Sessions::Table, Sessions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sessions_account_id")
                    .table(Sessions::Table)
                    .col(Sessions::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let _ = manager
            .drop_index(Index::drop().name("idx_sessions_account_id").to_owned())
            .await;

        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

fn notification_flag(col: Accounts, default: bool) -> ColumnDef {
    ColumnDef::new(col).boolean().not_null().default(default).to_owned()
}

#[derive(DeriveIden)]
pub(crate) enum Accounts {
    Table,
    Id,
    Email,
    Nickname,
    PasswordHash,
    Salt,
    PasswordIterations,
    EmailVerified,
    EmailCheckToken,
    EmailCheckTokenGeneratedAt,
    JoinedAt,
    Bio,
    Url,
    Occupation,
    Location,
    ProfileImage,
    StudyCreatedByEmail,
    StudyCreatedByWeb,
    StudyEnrollmentResultByEmail,
    StudyEnrollmentResultByWeb,
    StudyUpdatedByEmail,
    StudyUpdatedByWeb,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    AccountId,
    CreatedAt,
    ExpiresAt,
}
