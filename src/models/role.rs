//! Role entity model

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Name of the role allowed to list every user.
pub const ADMIN_ROLE: &str = "Admin";

/// Role given to self-registered users.
pub const STANDARD_ROLE: &str = "Standard";

/// Authorization role
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Role name, e.g. "Admin" or "Standard"
    #[sea_orm(unique)]
    pub name: String,

    pub description: Option<String>,

    pub is_deleted: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
