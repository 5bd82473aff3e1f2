use crate::server::{
    data::ticket::TicketRepository,
    model::ticket::{CreateScanParams, CreateTicketParams, TicketCredential},
};
use chrono::Utc;
use entity::{ticket::TicketStatus, ticket_scan::ScanChannel};
use sea_orm::{DbErr, EntityTrait};
use test_utils::{builder::TestBuilder, factory};

mod create;
mod find_by_credential;
mod mark_used;
mod scan_history;

/// Creates the user/event/tier/payment graph most ticket tests need.
async fn setup(
    db: &sea_orm::DatabaseConnection,
    tier_quantity: i32,
) -> Result<
    (
        entity::user::Model,
        entity::event::Model,
        entity::event_tier::Model,
        entity::payment::Model,
    ),
    DbErr,
> {
    let organizer = factory::user::create_organizer(db).await?;
    let attendee = factory::user::create_user(db).await?;
    let event = factory::event::create_event(db, organizer.id).await?;
    let tier = factory::event_tier::EventTierFactory::new(db, event.id)
        .quantity(tier_quantity)
        .build()
        .await?;
    let payment = factory::payment::create_payment(db, attendee.id, event.id, tier.id).await?;

    Ok((attendee, event, tier, payment))
}

fn ticket_params(
    event_id: i32,
    tier_id: i32,
    user_id: i32,
    payment_id: i32,
    suffix: &str,
) -> CreateTicketParams {
    CreateTicketParams {
        event_id,
        tier_id,
        user_id,
        payment_id,
        qr_code: format!("TKT-QR-0-{}", suffix),
        backup_code: format!("9{:05}", payment_id % 100_000),
        cultural_selections: None,
    }
}
