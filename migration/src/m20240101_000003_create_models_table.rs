use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_platforms_table::Platforms;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Models::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Models::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Models::PlatformId).integer().not_null())
                    .col(ColumnDef::new(Models::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Models::Alias).string_len(200))
                    .col(
                        ColumnDef::new(Models::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_models_platform_id")
                            .from(Models::Table, Models::PlatformId)
                            .to(Platforms::Table, Platforms::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_models_platform_id")
                    .table(Models::Table)
                    .col(Models::PlatformId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Models::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Models {
    Table,
    Id,
    PlatformId,
    Name,
    Alias,
    CreatedAt,
}
