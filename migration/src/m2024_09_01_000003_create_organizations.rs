//! Migration to create the organizations table.
//!
//! Holds the public profile of the organization; outgoing mail is signed
//! with its name and contact details.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).text().not_null())
                    .col(ColumnDef::new(Organizations::Image).text().null())
                    .col(ColumnDef::new(Organizations::Address).text().null())
                    .col(ColumnDef::new(Organizations::Phone).big_integer().null())
                    .col(ColumnDef::new(Organizations::Email).text().not_null())
                    .col(ColumnDef::new(Organizations::WelcomeText).text().not_null())
                    .col(ColumnDef::new(Organizations::AboutUsText).text().null())
                    .col(ColumnDef::new(Organizations::FacebookUrl).text().null())
                    .col(
                        ColumnDef::new(Organizations::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    Name,
    Image,
    Address,
    Phone,
    Email,
    WelcomeText,
    AboutUsText,
    FacebookUrl,
    IsDeleted,
    CreatedAt,
}
