//! # Unit of Work
//!
//! Groups repository writes in one database transaction. Nothing is visible
//! to other connections until [`UnitOfWork::save`] commits; dropping an
//! unsaved unit of work rolls the transaction back.

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::error::RepositoryError;
use crate::repositories::{OrganizationRepository, RoleRepository, UserRepository};

pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Opens a transaction on `db`.
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, RepositoryError> {
        let txn = db.begin().await.map_err(RepositoryError::database_error)?;
        Ok(Self { txn })
    }

    pub fn users(&self) -> UserRepository<'_, DatabaseTransaction> {
        UserRepository::new(&self.txn)
    }

    pub fn roles(&self) -> RoleRepository<'_, DatabaseTransaction> {
        RoleRepository::new(&self.txn)
    }

    pub fn organizations(&self) -> OrganizationRepository<'_, DatabaseTransaction> {
        OrganizationRepository::new(&self.txn)
    }

    /// Commits every change made through this unit of work.
    pub async fn save(self) -> Result<(), RepositoryError> {
        self.txn
            .commit()
            .await
            .map_err(RepositoryError::database_error)
    }
}
