use super::*;

/// Tests creating a pending payment.
///
/// Expected: Ok with pending status and the given reference
#[tokio::test]
async fn creates_pending_payment() -> Result<(), DbErr> {
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

    let repo = PaymentRepository::new(db);
    let payment = repo
        .create(CreatePaymentParams {
            user_id: attendee.id,
            event_id: event.id,
            tier_id: tier.id,
            amount: 500_000,
            method: "card".to_string(),
            reference: "PAY-1-ABCDEFGH".to_string(),
        })
        .await?;

    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.amount, 500_000);

    let by_reference = repo.find_by_reference("PAY-1-ABCDEFGH").await?;
    assert_eq!(by_reference.map(|p| p.id), Some(payment.id));

    Ok(())
}

/// Tests that references are unique.
///
/// Expected: Err on a second payment with the same reference
#[tokio::test]
async fn duplicate_reference_fails() -> Result<(), DbErr> {
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

    let repo = PaymentRepository::new(db);
    let params = |reference: &str| CreatePaymentParams {
        user_id: attendee.id,
        event_id: event.id,
        tier_id: tier.id,
        amount: 500_000,
        method: "card".to_string(),
        reference: reference.to_string(),
    };

    repo.create(params("PAY-DUP")).await?;
    assert!(repo.create(params("PAY-DUP")).await.is_err());

    Ok(())
}

/// Tests listing a user's payments, newest first.
///
/// Expected: only the user's payments, in reverse creation order
#[tokio::test]
async fn lists_user_payments_newest_first() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;
    let attendee = factory::user::create_user(db).await?;
    let other = factory::user::create_user(db).await?;
    let event = factory::event::create_event(db, organizer.id).await?;
    let tier = factory::event_tier::create_tier(db, event.id).await?;

    factory::payment::create_payment(db, attendee.id, event.id, tier.id).await?;
    factory::payment::create_payment(db, attendee.id, event.id, tier.id).await?;
    factory::payment::create_payment(db, other.id, event.id, tier.id).await?;

    let mine = PaymentRepository::new(db).find_by_user(attendee.id).await?;
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|p| p.user_id == attendee.id));

    Ok(())
}
