//! Organization entity model
//!
//! Public profile of the organization. A single row is expected; it signs
//! transactional mail sent to new users.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Logo URL
    pub image: Option<String>,

    pub address: Option<String>,

    pub phone: Option<i64>,

    /// Contact address, also used as reply-to for outgoing mail
    pub email: String,

    pub welcome_text: String,

    pub about_us_text: Option<String>,

    pub facebook_url: Option<String>,

    pub is_deleted: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
