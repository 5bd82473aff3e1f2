use super::*;

/// Tests that the feed returns only published events, ordered by start date.
///
/// Expected: draft and cancelled events absent; soonest event first
#[tokio::test]
async fn feed_filters_and_orders() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;

    let later = factory::event::EventFactory::new(db, organizer.id)
        .start_date(Utc::now() + Duration::days(14))
        .build()
        .await?;
    let sooner = factory::event::EventFactory::new(db, organizer.id)
        .start_date(Utc::now() + Duration::days(2))
        .build()
        .await?;
    factory::event::EventFactory::new(db, organizer.id)
        .status(EventStatus::Draft)
        .build()
        .await?;
    factory::event::EventFactory::new(db, organizer.id)
        .status(EventStatus::Cancelled)
        .build()
        .await?;

    let repo = EventRepository::new(db);
    let (events, total) = repo
        .get_feed_paginated(&EventFeedParams {
            page: 0,
            per_page: 10,
            category: None,
            search: None,
        })
        .await?;

    assert_eq!(total, 2);
    assert_eq!(events[0].id, sooner.id);
    assert_eq!(events[1].id, later.id);

    Ok(())
}

/// Tests category and title-search filters.
///
/// Expected: each filter narrows the feed to matching events
#[tokio::test]
async fn feed_applies_filters() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;

    let concert = factory::event::EventFactory::new(db, organizer.id)
        .title("Afrobeats Concert")
        .category("music")
        .build()
        .await?;
    factory::event::EventFactory::new(db, organizer.id)
        .title("Tech Meetup")
        .category("tech")
        .build()
        .await?;

    let repo = EventRepository::new(db);

    let (by_category, _) = repo
        .get_feed_paginated(&EventFeedParams {
            page: 0,
            per_page: 10,
            category: Some("music".to_string()),
            search: None,
        })
        .await?;
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, concert.id);

    let (by_search, _) = repo
        .get_feed_paginated(&EventFeedParams {
            page: 0,
            per_page: 10,
            category: None,
            search: Some("Afrobeats".to_string()),
        })
        .await?;
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].id, concert.id);

    let (none, total) = repo
        .get_feed_paginated(&EventFeedParams {
            page: 0,
            per_page: 10,
            category: Some("sports".to_string()),
            search: None,
        })
        .await?;
    assert!(none.is_empty());
    assert_eq!(total, 0);

    Ok(())
}

/// Tests pagination of the feed.
///
/// Expected: page size respected; totals count every published event
#[tokio::test]
async fn feed_paginates() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticketing_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let organizer = factory::user::create_organizer(db).await?;
    for _ in 0..5 {
        factory::event::create_event(db, organizer.id).await?;
    }

    let repo = EventRepository::new(db);
    let (first_page, total) = repo
        .get_feed_paginated(&EventFeedParams {
            page: 0,
            per_page: 2,
            category: None,
            search: None,
        })
        .await?;

    assert_eq!(total, 5);
    assert_eq!(first_page.len(), 2);

    let (last_page, _) = repo
        .get_feed_paginated(&EventFeedParams {
            page: 2,
            per_page: 2,
            category: None,
            search: None,
        })
        .await?;
    assert_eq!(last_page.len(), 1);

    Ok(())
}
