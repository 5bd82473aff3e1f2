use super::*;

/// Tests event-scoped tier lookup.
///
/// Verifies that a tier resolves only against its own event, which is the
/// issuance precondition for `TierNotFound`.
///
/// Expected: Some for the owning event, None for another event
#[tokio::test]
async fn tier_lookup_is_event_scoped() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;
    let event = factory::event::create_event(db, organizer.id).await?;
    let other_event = factory::event::create_event(db, organizer.id).await?;
    let tier = factory::event_tier::create_tier(db, event.id).await?;

    let repo = EventRepository::new(db);

    let scoped = repo.get_tier_for_event(tier.id, event.id).await?;
    assert_eq!(scoped.map(|t| t.id), Some(tier.id));

    let cross = repo.get_tier_for_event(tier.id, other_event.id).await?;
    assert!(cross.is_none());

    let unscoped = repo.get_tier(tier.id).await?;
    assert!(unscoped.is_some());

    Ok(())
}
