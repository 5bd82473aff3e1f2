use super::*;

/// Tests the transactional create-plus-increment.
///
/// Verifies that the ticket row and the tier's sold count move together.
///
/// Expected: Ok(Some) with active status and sold count 1
#[tokio::test]
async fn creates_ticket_and_increments_sold() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;

    let repo = TicketRepository::new(db);
    let ticket = repo
        .create_with_sold_increment(ticket_params(
            event.id, tier.id, attendee.id, payment.id, "CREATE1",
        ))
        .await?
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Active);
    assert!(ticket.used_at.is_none());

    let stored_tier = entity::prelude::EventTier::find_by_id(tier.id)
        .one(db)
        .await?
        .unwrap();
    assert_eq!(stored_tier.sold, 1);

    Ok(())
}

/// Tests the capacity guard inside the issuance transaction.
///
/// Verifies that a full tier rejects the insert and rolls the whole
/// transaction back: no ticket row, sold count untouched.
///
/// Expected: Ok(None) and no ticket row for the payment
#[tokio::test]
async fn full_tier_rolls_back_creation() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, _tier, payment) = setup(db, 10).await?;
    let full_tier = factory::event_tier::EventTierFactory::new(db, event.id)
        .quantity(3)
        .sold(3)
        .build()
        .await?;

    let repo = TicketRepository::new(db);
    let result = repo
        .create_with_sold_increment(ticket_params(
            event.id,
            full_tier.id,
            attendee.id,
            payment.id,
            "FULL1",
        ))
        .await?;

    assert!(result.is_none());
    assert!(repo.find_by_payment_id(payment.id).await?.is_none());

    let stored_tier = entity::prelude::EventTier::find_by_id(full_tier.id)
        .one(db)
        .await?
        .unwrap();
    assert_eq!(stored_tier.sold, 3);

    Ok(())
}

/// Tests the per-payment uniqueness backstop.
///
/// Expected: Err on a second ticket referencing the same payment
#[tokio::test]
async fn second_ticket_for_payment_fails() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;

    let repo = TicketRepository::new(db);
    repo.create_with_sold_increment(ticket_params(
        event.id, tier.id, attendee.id, payment.id, "UNIQ1",
    ))
    .await?
    .unwrap();

    let second = repo
        .create_with_sold_increment(ticket_params(
            event.id, tier.id, attendee.id, payment.id, "UNIQ2",
        ))
        .await;
    assert!(second.is_err());

    Ok(())
}
