use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260610_000001_create_user_table::User, m20260610_000002_create_event_table::Event,
    m20260610_000003_create_event_tier_table::EventTier,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(pk_auto(Payment::Id))
                    .col(integer(Payment::UserId))
                    .col(integer(Payment::EventId))
                    .col(integer(Payment::TierId))
                    .col(big_integer(Payment::Amount))
                    .col(string(Payment::Method))
                    .col(string_uniq(Payment::Reference))
                    .col(string(Payment::Status))
                    .col(
                        timestamp(Payment::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .col(
                        timestamp(Payment::UpdatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_user_id")
                            .from(Payment::Table, Payment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_event_id")
                            .from(Payment::Table, Payment::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_tier_id")
                            .from(Payment::Table, Payment::TierId)
                            .to(EventTier::Table, EventTier::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Payment {
    Table,
    Id,
    UserId,
    EventId,
    TierId,
    Amount,
    Method,
    Reference,
    Status,
    CreatedAt,
    UpdatedAt,
}
