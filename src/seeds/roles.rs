//! Role seeding

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;

use crate::models::role::{ADMIN_ROLE, STANDARD_ROLE};
use crate::repositories::RoleRepository;

const ROLES: [(&str, &str); 2] = [
    (ADMIN_ROLE, "Full access, including the user list"),
    (STANDARD_ROLE, "Registered user"),
];

/// Creates the Admin and Standard roles when missing.
pub async fn seed_roles(db: &DatabaseConnection) -> Result<()> {
    let repo = RoleRepository::new(db);

    for (name, description) in ROLES {
        if repo.get_by_name(name).await?.is_some() {
            log::info!("Role '{}' already exists, skipping", name);
            continue;
        }

        repo.create(name, Some(description))
            .await
            .with_context(|| format!("failed to create role '{name}'"))?;
        log::info!("Created role: {}", name);
    }

    Ok(())
}
