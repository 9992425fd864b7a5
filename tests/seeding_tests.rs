//! Seeders populate a fresh database and can run again safely.

use anyhow::Result;
use ong::crypto::verify_password;
use ong::models::{Organization, Role, User};
use ong::repositories::{OrganizationRepository, RoleRepository, UserRepository};
use ong::seeds::{seed_all, seed_users};
use sea_orm::{EntityTrait, PaginatorTrait};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::setup_test_db;

#[tokio::test]
async fn seed_all_is_idempotent() -> Result<()> {
    let db = setup_test_db().await?;

    seed_all(&db).await?;
    seed_all(&db).await?;

    assert_eq!(Role::find().count(&db).await?, 2);
    assert_eq!(User::find().count(&db).await?, 20);
    assert_eq!(Organization::find().count(&db).await?, 1);
    Ok(())
}

#[tokio::test]
async fn seeded_users_split_between_roles() -> Result<()> {
    let db = setup_test_db().await?;
    seed_all(&db).await?;

    let roles = RoleRepository::new(&db);
    let admin = roles.require_by_name("Admin").await?;
    let standard = roles.require_by_name("Standard").await?;

    let users = UserRepository::new(&db);
    let first = users.get_by_email("mail1@Mail.com").await?.unwrap();
    assert_eq!(first.first_name, "User 1");
    assert_eq!(first.last_name, "AdminUser 1");
    assert_eq!(first.role_id, admin.id);
    assert!(verify_password("Admin123", &first.password));

    let last = users.get_by_email("mail20@Mail.com").await?.unwrap();
    assert_eq!(last.last_name, "RegularUser 20");
    assert_eq!(last.role_id, standard.id);
    assert!(verify_password("User123", &last.password));
    assert!(!verify_password("Admin123", &last.password));

    let organization = OrganizationRepository::new(&db).current().await?.unwrap();
    assert_eq!(organization.name, "Somos Más");
    assert_eq!(organization.email, "somomasong@gmail.com");
    Ok(())
}

#[tokio::test]
async fn users_cannot_be_seeded_before_roles() -> Result<()> {
    let db = setup_test_db().await?;

    assert!(seed_users(&db).await.is_err());
    assert_eq!(User::find().count(&db).await?, 0);
    Ok(())
}
