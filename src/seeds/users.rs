//! Demo user seeding
//!
//! Users 1 to 10 are admins (password `Admin123`), users 11 to 20 are
//! standard users (password `User123`).

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;

use crate::crypto::hash_password;
use crate::models::role::{ADMIN_ROLE, STANDARD_ROLE};
use crate::repositories::{NewUser, RoleRepository, UserRepository};

pub const SEEDED_USER_COUNT: u32 = 20;
const ADMIN_COUNT: u32 = 10;

pub const ADMIN_PASSWORD: &str = "Admin123";
pub const STANDARD_PASSWORD: &str = "User123";

/// Email of the `index`-th demo user (1-based).
pub fn seed_email(index: u32) -> String {
    format!("mail{index}@Mail.com")
}

/// Creates the demo users whose email is not yet registered.
pub async fn seed_users(db: &DatabaseConnection) -> Result<()> {
    let roles = RoleRepository::new(db);
    let admin = roles
        .require_by_name(ADMIN_ROLE)
        .await
        .context("roles must be seeded before users")?;
    let standard = roles
        .require_by_name(STANDARD_ROLE)
        .await
        .context("roles must be seeded before users")?;

    let admin_hash = hash_password(ADMIN_PASSWORD);
    let standard_hash = hash_password(STANDARD_PASSWORD);
    let users = UserRepository::new(db);

    let mut created = 0;
    for index in 1..=SEEDED_USER_COUNT {
        let email = seed_email(index);
        if users.email_taken(&email).await? {
            continue;
        }

        let is_admin = index <= ADMIN_COUNT;
        let last_name = if is_admin {
            format!("AdminUser {index}")
        } else {
            format!("RegularUser {index}")
        };

        users
            .create(NewUser {
                first_name: format!("User {index}"),
                last_name,
                email: email.clone(),
                password: if is_admin { admin_hash.clone() } else { standard_hash.clone() },
                photo: None,
                role_id: if is_admin { admin.id } else { standard.id },
            })
            .await
            .with_context(|| format!("failed to create user '{email}'"))?;
        created += 1;
    }

    log::info!("Seeded {} users", created);
    Ok(())
}
