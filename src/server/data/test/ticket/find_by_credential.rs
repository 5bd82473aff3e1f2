use super::*;

/// Tests credential lookups over both code types.
///
/// Expected: the QR token and the backup code both resolve to the ticket;
/// unknown codes resolve to nothing
#[tokio::test]
async fn resolves_qr_and_backup_codes() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;
    let ticket = factory::ticket::TicketFactory::new(db, event.id, tier.id, attendee.id, payment.id)
        .qr_code("TKT-QR-0-LOOKUP000000001")
        .backup_code("135790")
        .build()
        .await?;

    let repo = TicketRepository::new(db);

    let by_qr = repo
        .find_by_credential(&TicketCredential::QrCode(
            "TKT-QR-0-LOOKUP000000001".to_string(),
        ))
        .await?;
    assert_eq!(by_qr.map(|t| t.id), Some(ticket.id));

    let by_backup = repo
        .find_by_credential(&TicketCredential::BackupCode("135790".to_string()))
        .await?;
    assert_eq!(by_backup.map(|t| t.id), Some(ticket.id));

    let miss = repo
        .find_by_credential(&TicketCredential::BackupCode("000001".to_string()))
        .await?;
    assert!(miss.is_none());

    // A backup code never matches through the QR lookup
    let cross = repo
        .find_by_credential(&TicketCredential::QrCode("135790".to_string()))
        .await?;
    assert!(cross.is_none());

    Ok(())
}

/// Tests the payment idempotency lookup.
///
/// Expected: Some once a ticket references the payment, None before
#[tokio::test]
async fn finds_ticket_by_payment() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;

    let repo = TicketRepository::new(db);
    assert!(repo.find_by_payment_id(payment.id).await?.is_none());

    let ticket =
        factory::ticket::create_ticket(db, event.id, tier.id, attendee.id, payment.id).await?;

    let found = repo.find_by_payment_id(payment.id).await?;
    assert_eq!(found.map(|t| t.id), Some(ticket.id));

    Ok(())
}
