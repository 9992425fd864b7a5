//! UserService against a seeded database.

use anyhow::Result;
use ong::error::ServiceError;
use ong::pagination::{PageRequest, PaginationUriBuilder};
use ong::seeds::seed_all;
use ong::services::UserService;
use ong::storage::LocalImageStore;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::setup_test_db;

#[tokio::test]
async fn get_user_by_id_skips_deleted_users() -> Result<()> {
    let db = setup_test_db().await?;
    seed_all(&db).await?;
    let uploads = tempfile::tempdir()?;
    let store = LocalImageStore::new(uploads.path(), "https://test/uploads");
    let uri_builder = PaginationUriBuilder::new("https://test")?;
    let service = UserService::new(&db, &uri_builder, &store);

    assert_eq!(service.get_user_by_id(3).await?.email, "mail3@Mail.com");

    service.delete_user(3).await?;
    assert!(!service.user_exists(3).await?);
    assert!(matches!(
        service.get_user_by_id(3).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        service.delete_user(3).await,
        Err(ServiceError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn links_keep_base_path_prefix() -> Result<()> {
    let db = setup_test_db().await?;
    seed_all(&db).await?;
    let uploads = tempfile::tempdir()?;
    let store = LocalImageStore::new(uploads.path(), "https://ong.example.org/api/uploads");
    let uri_builder = PaginationUriBuilder::new("https://ong.example.org/api")?;
    let service = UserService::new(&db, &uri_builder, &store);

    let listing = service.get_users(PageRequest::new(2, 10)).await?;

    assert_eq!(listing.page.items.len(), 10);
    assert_eq!(listing.page.items[0].id, 11);
    assert!(listing.next_page_url.is_none());
    assert_eq!(
        listing.previous_page_url.as_deref(),
        Some("https://ong.example.org/api/users?page=1")
    );
    Ok(())
}
