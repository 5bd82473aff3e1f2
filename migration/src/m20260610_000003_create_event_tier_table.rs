use sea_orm_migration::{prelude::*, schema::*};

use super::m20260610_000002_create_event_table::Event;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventTier::Table)
                    .if_not_exists()
                    .col(pk_auto(EventTier::Id))
                    .col(integer(EventTier::EventId))
                    .col(string(EventTier::Name))
                    .col(big_integer(EventTier::Price))
                    .col(integer(EventTier::Quantity))
                    .col(integer(EventTier::Sold).default(0))
                    .col(
                        timestamp(EventTier::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_tier_event_id")
                            .from(EventTier::Table, EventTier::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventTier::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum EventTier {
    Table,
    Id,
    EventId,
    Name,
    Price,
    Quantity,
    Sold,
    CreatedAt,
}
