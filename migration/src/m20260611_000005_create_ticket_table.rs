use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260610_000001_create_user_table::User, m20260610_000002_create_event_table::Event,
    m20260610_000003_create_event_tier_table::EventTier,
    m20260611_000004_create_payment_table::Payment,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(pk_auto(Ticket::Id))
                    .col(integer(Ticket::EventId))
                    .col(integer(Ticket::TierId))
                    .col(integer(Ticket::UserId))
                    .col(integer_uniq(Ticket::PaymentId))
                    .col(string_uniq(Ticket::QrCode))
                    .col(string_uniq(Ticket::BackupCode))
                    .col(string(Ticket::Status))
                    .col(json_null(Ticket::CulturalSelections))
                    .col(timestamp(Ticket::IssuedAt))
                    .col(timestamp_null(Ticket::UsedAt))
                    .col(integer_null(Ticket::ScannedBy))
                    .col(string_null(Ticket::ScanLocation))
                    .col(
                        timestamp(Ticket::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_event_id")
                            .from(Ticket::Table, Ticket::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_tier_id")
                            .from(Ticket::Table, Ticket::TierId)
                            .to(EventTier::Table, EventTier::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_user_id")
                            .from(Ticket::Table, Ticket::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_payment_id")
                            .from(Ticket::Table, Ticket::PaymentId)
                            .to(Payment::Table, Payment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ticket {
    Table,
    Id,
    EventId,
    TierId,
    UserId,
    PaymentId,
    QrCode,
    BackupCode,
    Status,
    CulturalSelections,
    IssuedAt,
    UsedAt,
    ScannedBy,
    ScanLocation,
    CreatedAt,
}
