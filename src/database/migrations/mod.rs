//! SeaORM migrations for the `companies` table

use sea_orm_migration::prelude::*;

pub mod m20250829_100000_create_companies;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20250829_100000_create_companies::Migration)]
    }
}
