//! Database seeding
//!
//! Fills a fresh database with the two roles, twenty demo users and the
//! organization profile. Every seeder skips rows that already exist, so
//! running it again is harmless.

pub mod organization;
pub mod roles;
pub mod users;

pub use organization::seed_organization;
pub use roles::seed_roles;
pub use users::seed_users;

use anyhow::Result;
use sea_orm::DatabaseConnection;

/// Seeds roles first, since users reference them.
pub async fn seed_all(db: &DatabaseConnection) -> Result<()> {
    seed_roles(db).await?;
    seed_users(db).await?;
    seed_organization(db).await?;
    log::info!("Database seeding completed");
    Ok(())
}
