//! Organization profile seeding

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};

use crate::models::organization::ActiveModel as OrganizationActiveModel;
use crate::repositories::OrganizationRepository;

pub const ORGANIZATION_NAME: &str = "Somos Más";

/// Creates the organization profile unless one already exists.
pub async fn seed_organization(db: &DatabaseConnection) -> Result<()> {
    let repo = OrganizationRepository::new(db);
    if let Some(existing) = repo.current().await? {
        log::info!("Organization '{}' already exists, skipping", existing.name);
        return Ok(());
    }

    let organization = OrganizationActiveModel {
        name: Set(ORGANIZATION_NAME.to_string()),
        image: Set(Some("imageOrganization.jpg".to_string())),
        address: Set(Some("Catamarca 1585 , CP: 1585".to_string())),
        phone: Set(Some(44808900)),
        email: Set("somomasong@gmail.com".to_string()),
        welcome_text: Set("Bienvenidos a nuestro sitio web".to_string()),
        about_us_text: Set(Some(
            "Desde 1997 trabajamos con los chicos y chicas, mamás y papás, abuelos y vecinos \
             del barrio La Cava generando procesos de crecimiento y de inserción social."
                .to_string(),
        )),
        facebook_url: Set(Some("https://facebook.com/organization".to_string())),
        is_deleted: Set(false),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    repo.create(organization)
        .await
        .context("failed to create organization profile")?;
    log::info!("Created organization: {}", ORGANIZATION_NAME);
    Ok(())
}
