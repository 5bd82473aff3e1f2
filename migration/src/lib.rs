pub use sea_orm_migration::prelude::*;

mod m20260610_000001_create_user_table;
mod m20260610_000002_create_event_table;
mod m20260610_000003_create_event_tier_table;
mod m20260611_000004_create_payment_table;
mod m20260611_000005_create_ticket_table;
mod m20260611_000006_create_ticket_scan_table;
mod m20260612_000007_create_notification_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260610_000001_create_user_table::Migration),
            Box::new(m20260610_000002_create_event_table::Migration),
            Box::new(m20260610_000003_create_event_tier_table::Migration),
            Box::new(m20260611_000004_create_payment_table::Migration),
            Box::new(m20260611_000005_create_ticket_table::Migration),
            Box::new(m20260611_000006_create_ticket_scan_table::Migration),
            Box::new(m20260612_000007_create_notification_table::Migration),
        ]
    }
}
