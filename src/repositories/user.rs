//! # User Repository
//!
//! CRUD over the `users` table. Every read hides soft-deleted rows; `delete`
//! flags a row instead of removing it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::error::RepositoryError;
use crate::models::user::{self, ActiveModel as UserActiveModel, Entity as User, Model as UserModel};

/// Data needed to insert a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Already hashed password
    pub password: String,
    pub photo: Option<String>,
    pub role_id: i32,
}

/// Repository for user rows, usable on the pool or inside a transaction
pub struct UserRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// All live users, ordered by id.
    pub async fn get_all(&self) -> Result<Vec<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::IsDeleted.eq(false))
            .order_by_asc(user::Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<UserModel>, RepositoryError> {
        User::find_by_id(id)
            .filter(user::Column::IsDeleted.eq(false))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserModel>, RepositoryError> {
        User::find()
            .filter(user::Column::Email.eq(email.trim()))
            .filter(user::Column::IsDeleted.eq(false))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Inserts a user. A duplicate email surfaces as [`RepositoryError::Conflict`].
    pub async fn create(&self, new_user: NewUser) -> Result<UserModel, RepositoryError> {
        if new_user.email.trim().is_empty() {
            return Err(RepositoryError::validation_error("Email cannot be empty"));
        }

        let user = UserActiveModel {
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            email: Set(new_user.email.trim().to_string()),
            password: Set(new_user.password),
            photo: Set(new_user.photo),
            role_id: Set(new_user.role_id),
            is_deleted: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
            ..Default::default()
        };

        user.insert(self.db).await.map_err(|err| {
            match RepositoryError::database_error(err) {
                RepositoryError::Conflict(_) => {
                    RepositoryError::Conflict("A user with this email already exists".to_string())
                }
                other => other,
            }
        })
    }

    /// Persists the mutable fields of `entity` and stamps `updated_at`.
    pub async fn update(&self, entity: UserModel) -> Result<UserModel, RepositoryError> {
        let id = entity.id;
        let mut active = entity.clone().into_active_model();
        active.first_name = Set(entity.first_name);
        active.last_name = Set(entity.last_name);
        active.photo = Set(entity.photo);
        active.role_id = Set(entity.role_id);
        active.updated_at = Set(Some(Utc::now().into()));

        active.update(self.db).await.map_err(|err| match err {
            sea_orm::DbErr::RecordNotUpdated => {
                RepositoryError::not_found(format!("User {id} not found"))
            }
            other => RepositoryError::database_error(other),
        })
    }

    /// Soft-deletes the user with `id`.
    pub async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let user = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("User {id} not found")))?;

        let mut active = user.into_active_model();
        active.is_deleted = Set(true);
        active.updated_at = Set(Some(Utc::now().into()));
        active
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(())
    }

    /// Whether a live user with `id` exists.
    pub async fn entity_exists(&self, id: i32) -> Result<bool, RepositoryError> {
        let count = User::find_by_id(id)
            .filter(user::Column::IsDeleted.eq(false))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(count > 0)
    }

    /// Whether any row, live or deleted, uses `email`.
    pub async fn email_taken(&self, email: &str) -> Result<bool, RepositoryError> {
        let count = User::find()
            .filter(user::Column::Email.eq(email.trim()))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok(count > 0)
    }
}
