//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20241120_000001_create_catalog_tables;
mod m20241120_000002_create_account_tables;
mod m20241120_000003_create_order_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241120_000001_create_catalog_tables::Migration),
            Box::new(m20241120_000002_create_account_tables::Migration),
            Box::new(m20241120_000003_create_order_tables::Migration),
        ]
    }
}
