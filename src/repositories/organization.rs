//! # Organization Repository

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
};

use crate::error::RepositoryError;
use crate::models::organization::{
    self, ActiveModel as OrganizationActiveModel, Entity as Organization,
    Model as OrganizationModel,
};

pub struct OrganizationRepository<'a, C: ConnectionTrait> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> OrganizationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// The organization profile; the oldest live row when several exist.
    pub async fn current(&self) -> Result<Option<OrganizationModel>, RepositoryError> {
        Organization::find()
            .filter(organization::Column::IsDeleted.eq(false))
            .order_by_asc(organization::Column::Id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create(
        &self,
        organization: OrganizationActiveModel,
    ) -> Result<OrganizationModel, RepositoryError> {
        organization
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
