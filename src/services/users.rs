//! User administration: lookup, paginated listing, update and soft delete.

use sea_orm::DatabaseConnection;

use crate::error::ServiceError;
use crate::models::user::Model as UserModel;
use crate::pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest, PaginationUriBuilder, paginate_request};
use crate::repositories::{UnitOfWork, UserRepository};
use crate::storage::{ImageStore, ImageUpload};

/// Route the user listing is served from.
pub const USERS_ROUTE: &str = "/users";

/// Optional changes applied by [`UserService::update_user`]
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo: Option<ImageUpload>,
}

/// One page of users with absolute links to the adjacent pages
#[derive(Debug, Clone)]
pub struct UserListing {
    pub page: Page<UserModel>,
    pub next_page_url: Option<String>,
    pub previous_page_url: Option<String>,
}

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
    uri_builder: &'a PaginationUriBuilder,
    image_store: &'a dyn ImageStore,
}

impl<'a> UserService<'a> {
    pub fn new(
        db: &'a DatabaseConnection,
        uri_builder: &'a PaginationUriBuilder,
        image_store: &'a dyn ImageStore,
    ) -> Self {
        Self {
            db,
            uri_builder,
            image_store,
        }
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<UserModel, ServiceError> {
        UserRepository::new(self.db)
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {id} not found")))
    }

    /// Loads every live user and returns the requested page.
    ///
    /// Links are built only for pages that exist according to the page
    /// flags; a page past the end still links back to `page - 1`.
    pub async fn get_users(&self, request: PageRequest) -> Result<UserListing, ServiceError> {
        let users = UserRepository::new(self.db).get_all().await?;
        let page = paginate_request(users, request);

        let next_page_url = page
            .has_next_page
            .then(|| self.page_link(page.current_page.saturating_add(1), page.page_size));
        let previous_page_url = page
            .has_previous_page
            .then(|| self.page_link(page.current_page - 1, page.page_size));

        tracing::debug!(
            page = page.current_page,
            page_size = page.page_size,
            total_records = page.total_records,
            "listed users"
        );

        Ok(UserListing {
            page,
            next_page_url,
            previous_page_url,
        })
    }

    fn page_link(&self, target_page: u64, page_size: u64) -> String {
        let mut route = format!("{USERS_ROUTE}?page={target_page}");
        if page_size != DEFAULT_PAGE_SIZE {
            route.push_str(&format!("&sizeByPage={page_size}"));
        }
        self.uri_builder.build_uri(target_page, &route).to_string()
    }

    /// Applies `changes` to the user with `id`. A new photo replaces the
    /// stored one; the old file is removed only after the commit, and the new
    /// file is removed again when the update fails.
    pub async fn update_user(
        &self,
        id: i32,
        changes: UserUpdate,
    ) -> Result<UserModel, ServiceError> {
        let uow = UnitOfWork::begin(self.db).await?;
        let mut user = uow
            .users()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {id} not found")))?;

        if let Some(first_name) = non_blank(changes.first_name) {
            user.first_name = first_name;
        }
        if let Some(last_name) = non_blank(changes.last_name) {
            user.last_name = last_name;
        }

        let previous_photo = user.photo.clone();
        let mut stored_photo = None;
        if let Some(photo) = changes.photo {
            let url = self.image_store.save(photo).await?;
            user.photo = Some(url.clone());
            stored_photo = Some(url);
        }

        let updated = match persist(uow, user).await {
            Ok(updated) => updated,
            Err(err) => {
                if let Some(url) = stored_photo {
                    self.remove_photo(&url).await;
                }
                return Err(err);
            }
        };

        if stored_photo.is_some()
            && let Some(previous) = previous_photo
        {
            self.remove_photo(&previous).await;
        }

        tracing::info!(user_id = id, "user updated");
        Ok(updated)
    }

    async fn remove_photo(&self, url: &str) {
        if let Err(err) = self.image_store.delete(url).await {
            tracing::warn!(url = %url, error = %err, "failed to remove photo");
        }
    }

    /// Soft-deletes the user with `id`.
    pub async fn delete_user(&self, id: i32) -> Result<(), ServiceError> {
        let uow = UnitOfWork::begin(self.db).await?;
        uow.users().delete(id).await?;
        uow.save().await?;

        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }

    pub async fn user_exists(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(UserRepository::new(self.db).entity_exists(id).await?)
    }
}

async fn persist(uow: UnitOfWork, user: UserModel) -> Result<UserModel, ServiceError> {
    let updated = uow.users().update(user).await?;
    uow.save().await?;
    Ok(updated)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
