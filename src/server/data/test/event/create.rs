use super::*;

/// Tests creating an event with its tiers in one transaction.
///
/// Verifies that the event starts as a draft and every tier starts with a
/// zero sold count.
///
/// Expected: Ok with event and both tiers created
#[tokio::test]
async fn creates_event_with_tiers() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;

    let start = Utc::now() + Duration::days(3);
    let repo = EventRepository::new(db);
    let (event, tiers) = repo
        .create_with_tiers(CreateEventParams {
            organizer_id: organizer.id,
            title: "Owambe Night".to_string(),
            description: Some("Live band".to_string()),
            venue: "Balmoral Hall".to_string(),
            category: "music".to_string(),
            start_date: start,
            end_date: start + Duration::hours(5),
            tiers: vec![
                CreateEventTierParams {
                    name: "Regular".to_string(),
                    price: 500_000,
                    quantity: 200,
                },
                CreateEventTierParams {
                    name: "VIP".to_string(),
                    price: 2_500_000,
                    quantity: 20,
                },
            ],
        })
        .await?;

    assert_eq!(event.status, EventStatus::Draft);
    assert_eq!(tiers.len(), 2);
    assert!(tiers.iter().all(|t| t.sold == 0));
    assert!(tiers.iter().all(|t| t.event_id == event.id));

    // Verify through a fresh lookup
    let stored = repo.get_with_tiers(event.id).await?;
    assert_eq!(stored.map(|(_, t)| t.len()), Some(2));

    Ok(())
}

/// Tests the status update path.
///
/// Expected: Ok with the new status persisted
#[tokio::test]
async fn updates_status() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;
    let event = factory::event::EventFactory::new(db, organizer.id)
        .status(EventStatus::Draft)
        .build()
        .await?;

    let repo = EventRepository::new(db);
    let updated = repo.update_status(event.id, EventStatus::Published).await?;
    assert_eq!(updated.status, EventStatus::Published);

    Ok(())
}
