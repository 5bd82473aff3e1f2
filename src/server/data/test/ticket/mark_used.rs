use super::*;

/// Tests the conditional active-to-used transition.
///
/// Verifies the linearization property: of two attempts, only the first
/// observes `active`; the loser changes nothing.
///
/// Expected: first true with stamps persisted, second false
#[tokio::test]
async fn transitions_exactly_once() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;
    let ticket =
        factory::ticket::create_ticket(db, event.id, tier.id, attendee.id, payment.id).await?;
    let agent = factory::user::create_organizer(db).await?;

    let repo = TicketRepository::new(db);

    let first = repo
        .mark_used_if_active(ticket.id, agent.id, Some("Gate A".to_string()), Utc::now())
        .await?;
    assert!(first);

    let second = repo
        .mark_used_if_active(ticket.id, agent.id, Some("Gate B".to_string()), Utc::now())
        .await?;
    assert!(!second);

    let stored = entity::prelude::Ticket::find_by_id(ticket.id)
        .one(db)
        .await?
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Used);
    assert_eq!(stored.scanned_by, Some(agent.id));
    assert_eq!(stored.scan_location.as_deref(), Some("Gate A"));
    assert!(stored.used_at.is_some());

    Ok(())
}

/// Tests that cancelled tickets never transition to used.
///
/// Expected: false, status unchanged
#[tokio::test]
async fn cancelled_ticket_never_becomes_used() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;
    let ticket = factory::ticket::TicketFactory::new(db, event.id, tier.id, attendee.id, payment.id)
        .status(TicketStatus::Cancelled)
        .build()
        .await?;
    let agent = factory::user::create_organizer(db).await?;

    let repo = TicketRepository::new(db);
    let transitioned = repo
        .mark_used_if_active(ticket.id, agent.id, None, Utc::now())
        .await?;
    assert!(!transitioned);

    let stored = entity::prelude::Ticket::find_by_id(ticket.id)
        .one(db)
        .await?
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Cancelled);

    Ok(())
}

/// Tests owner scoping of the cancellation transition.
///
/// Expected: another user's attempt matches nothing; the owner's succeeds
/// once and only once
#[tokio::test]
async fn cancel_is_owner_scoped_and_conditional() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;
    let ticket =
        factory::ticket::create_ticket(db, event.id, tier.id, attendee.id, payment.id).await?;
    let stranger = factory::user::create_user(db).await?;

    let repo = TicketRepository::new(db);

    assert!(!repo.cancel_if_active(ticket.id, stranger.id).await?);
    assert!(repo.cancel_if_active(ticket.id, attendee.id).await?);
    assert!(!repo.cancel_if_active(ticket.id, attendee.id).await?);

    let stored = entity::prelude::Ticket::find_by_id(ticket.id)
        .one(db)
        .await?
        .unwrap();
    assert_eq!(stored.status, TicketStatus::Cancelled);

    Ok(())
}
