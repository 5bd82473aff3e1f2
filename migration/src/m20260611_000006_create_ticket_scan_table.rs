use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260610_000001_create_user_table::User, m20260611_000005_create_ticket_table::Ticket,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketScan::Table)
                    .if_not_exists()
                    .col(pk_auto(TicketScan::Id))
                    .col(integer(TicketScan::TicketId))
                    .col(integer(TicketScan::ScannedBy))
                    .col(timestamp(TicketScan::ScannedAt))
                    .col(string_null(TicketScan::Location))
                    .col(string_null(TicketScan::DeviceInfo))
                    .col(string(TicketScan::Channel))
                    .col(
                        timestamp(TicketScan::CreatedAt)
                            .default(Expr::current_timestamp())
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_scan_ticket_id")
                            .from(TicketScan::Table, TicketScan::TicketId)
                            .to(Ticket::Table, Ticket::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_scan_scanned_by")
                            .from(TicketScan::Table, TicketScan::ScannedBy)
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
            .drop_table(Table::drop().table(TicketScan::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TicketScan {
    Table,
    Id,
    TicketId,
    ScannedBy,
    ScannedAt,
    Location,
    DeviceInfo,
    Channel,
    CreatedAt,
}
