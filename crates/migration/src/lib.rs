pub use sea_orm_migration::prelude::*;

mod join_table;
mod m20261001_000001_accounts;
mod m20261001_000002_tags_and_zones;
mod m20261001_000003_studies;

pub struct Migrator;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_accounts::Migration),
            Box::new(m20261001_000002_tags_and_zones::Migration),
            Box::new(m20261001_000003_studies::Migration),
        ]
    }
}
