use sea_orm_migration::{prelude::*, schema::*};

use super::m20260610_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(pk_auto(Event::Id))
                    .col(integer(Event::OrganizerId))
                    .col(string(Event::Title))
                    .col(text_null(Event::Description))
                    .col(string(Event::Venue))
                    .col(string(Event::Category))
                    .col(timestamp(Event::StartDate))
                    .col(timestamp(Event::EndDate))
                    .col(string(Event::Status))
                    .col(
                        timestamp(Event::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizer_id")
                            .from(Event::Table, Event::OrganizerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Event {
    Table,
    Id,
    OrganizerId,
    Title,
    Description,
    Venue,
    Category,
    StartDate,
    EndDate,
    Status,
    CreatedAt,
}
