//! # Role Repository

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::error::RepositoryError;
use crate::models::role::{self, ActiveModel as RoleActiveModel, Entity as Role, Model as RoleModel};

pub struct RoleRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> RoleRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<RoleModel>, RepositoryError> {
        Role::find_by_id(id)
            .filter(role::Column::IsDeleted.eq(false))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<RoleModel>, RepositoryError> {
        Role::find()
            .filter(role::Column::Name.eq(name))
            .filter(role::Column::IsDeleted.eq(false))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Looks up a role by name, failing when it has not been seeded.
    pub async fn require_by_name(&self, name: &str) -> Result<RoleModel, RepositoryError> {
        self.get_by_name(name)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("Role '{name}' is not configured")))
    }

    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<RoleModel, RepositoryError> {
        RoleActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            is_deleted: Set(false),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .map_err(RepositoryError::database_error)
    }
}
