//! User entity model
//!
//! This module contains the SeaORM entity model for the users table.
//! Rows are soft-deleted through `is_deleted`; the repository layer hides
//! deleted rows from every read.

use super::role::Entity as Role;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Registered user of the back office
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Auto-incremented identifier (primary key)
    #[sea_orm(primary_key)]
    pub id: i32,

    pub first_name: String,

    pub last_name: String,

    /// Login email, unique across the table
    #[sea_orm(unique)]
    pub email: String,

    /// Hex-encoded SHA-256 digest of the password
    pub password: String,

    /// Public URL of the profile photo
    pub photo: Option<String>,

    /// Role assigned to the user
    pub role_id: i32,

    pub is_deleted: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Role",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
}

impl Related<Role> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
