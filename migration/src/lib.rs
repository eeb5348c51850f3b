pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_platforms_table;
mod m20240101_000002_create_api_keys_table;
mod m20240101_000003_create_models_table;
mod m20240101_000004_create_health_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_platforms_table::Migration),
            Box::new(m20240101_000002_create_api_keys_table::Migration),
            Box::new(m20240101_000003_create_models_table::Migration),
            Box::new(m20240101_000004_create_health_table::Migration),
        ]
    }
}
