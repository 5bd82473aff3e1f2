use super::*;

/// Tests appending and reading scan records.
///
/// Expected: records come back newest first with their channels intact
#[tokio::test]
async fn appends_and_orders_scan_records() -> Result<(), DbErr> {
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

    repo.insert_scan(CreateScanParams {
        ticket_id: ticket.id,
        scanned_by: agent.id,
        location: Some("Gate A".to_string()),
        device_info: Some("scanner-01".to_string()),
        channel: ScanChannel::QrCode,
    })
    .await?;
    repo.insert_scan(CreateScanParams {
        ticket_id: ticket.id,
        scanned_by: agent.id,
        location: None,
        device_info: None,
        channel: ScanChannel::BackupCode,
    })
    .await?;

    let history = repo.scan_history(ticket.id).await?;
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|s| s.ticket_id == ticket.id));
    assert!(history
        .iter()
        .any(|s| s.channel == ScanChannel::BackupCode));
    // Newest first
    assert!(history[0].scanned_at >= history[1].scanned_at);

    Ok(())
}

/// Tests that history is scoped per ticket.
///
/// Expected: a ticket with no scans has an empty history even when other
/// tickets have records
#[tokio::test]
async fn history_is_per_ticket() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let (attendee, event, tier, payment) = setup(db, 10).await?;
    let scanned =
        factory::ticket::create_ticket(db, event.id, tier.id, attendee.id, payment.id).await?;

    let other_payment =
        factory::payment::create_payment(db, attendee.id, event.id, tier.id).await?;
    let untouched =
        factory::ticket::create_ticket(db, event.id, tier.id, attendee.id, other_payment.id)
            .await?;

    let agent = factory::user::create_organizer(db).await?;
    let repo = TicketRepository::new(db);

    repo.insert_scan(CreateScanParams {
        ticket_id: scanned.id,
        scanned_by: agent.id,
        location: None,
        device_info: None,
        channel: ScanChannel::QrCode,
    })
    .await?;

    assert_eq!(repo.scan_history(scanned.id).await?.len(), 1);
    assert!(repo.scan_history(untouched.id).await?.is_empty());

    Ok(())
}
