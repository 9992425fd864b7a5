//! Database migrations for the ONG backend.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_09_01_000001_create_roles;
mod m2024_09_01_000002_create_users;
mod m2024_09_01_000003_create_organizations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_09_01_000001_create_roles::Migration),
            Box::new(m2024_09_01_000002_create_users::Migration),
            Box::new(m2024_09_01_000003_create_organizations::Migration),
        ]
    }
}
