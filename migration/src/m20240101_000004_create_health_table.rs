use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Health::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Health::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Health::ResourceType).small_integer().not_null())
                    .col(ColumnDef::new(Health::ResourceId).integer().not_null())
                    .col(ColumnDef::new(Health::Status).small_integer().not_null())
                    .col(
                        ColumnDef::new(Health::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Health::NextAvailableAt).timestamp())
                    .col(
                        ColumnDef::new(Health::BackoffDuration)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Health::LastError).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Health::LastErrorCode)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Health::LastCheckAt).timestamp().not_null())
                    .col(ColumnDef::new(Health::LastSuccessAt).timestamp())
                    .col(
                        ColumnDef::new(Health::SuccessCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Health::ErrorCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Health::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Health::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个资源最多一条健康记录
        manager
            .create_index(
                Index::create()
                    .name("idx_health_resource")
                    .table(Health::Table)
                    .col(Health::ResourceType)
                    .col(Health::ResourceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_health_status")
                    .table(Health::Table)
                    .col(Health::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Health::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Health {
    Table,
    Id,
    ResourceType,
    ResourceId,
    Status,
    RetryCount,
    NextAvailableAt,
    BackoffDuration,
    LastError,
    LastErrorCode,
    LastCheckAt,
    LastSuccessAt,
    SuccessCount,
    ErrorCount,
    CreatedAt,
    UpdatedAt,
}
