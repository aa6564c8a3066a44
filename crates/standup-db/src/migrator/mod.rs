//! Database migrations

use sea_orm_migration::prelude::*;

mod m20250610_000001_init_schema;
mod m20250612_000001_status_record_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250610_000001_init_schema::Migration),
            Box::new(m20250612_000001_status_record_indexes::Migration),
        ]
    }
}
