use super::*;

/// Tests the conditional settlement transition.
///
/// Verifies that a pending payment transitions exactly once: the first
/// confirmation succeeds, every later attempt matches no row.
///
/// Expected: first true, replays false, status stays successful
#[tokio::test]
async fn settles_pending_payment_exactly_once() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;
    let attendee = factory::user::create_user(db).await?;
    let event = factory::event::create_event(db, organizer.id).await?;
    let tier = factory::event_tier::create_tier(db, event.id).await?;
    let payment = factory::payment::PaymentFactory::new(db, attendee.id, event.id, tier.id)
        .status(PaymentStatus::Pending)
        .build()
        .await?;

    let repo = PaymentRepository::new(db);

    let first = repo
        .mark_status_if_pending(&payment.reference, PaymentStatus::Successful)
        .await?;
    assert!(first);

    let replay = repo
        .mark_status_if_pending(&payment.reference, PaymentStatus::Successful)
        .await?;
    assert!(!replay);

    let flip = repo
        .mark_status_if_pending(&payment.reference, PaymentStatus::Failed)
        .await?;
    assert!(!flip);

    let stored = repo.find_by_reference(&payment.reference).await?.unwrap();
    assert_eq!(stored.status, PaymentStatus::Successful);

    Ok(())
}

/// Tests settlement against an unknown reference.
///
/// Expected: Ok(false), nothing changed
#[tokio::test]
async fn unknown_reference_matches_nothing() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = PaymentRepository::new(db);
    let result = repo
        .mark_status_if_pending("PAY-MISSING", PaymentStatus::Successful)
        .await?;
    assert!(!result);

    Ok(())
}
