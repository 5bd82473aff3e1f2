use super::*;

/// Tests looking a user up by phone number.
///
/// Expected: Ok(Some) for a registered number, Ok(None) otherwise
#[tokio::test]
async fn finds_user_by_phone() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::User)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let user = factory::user::UserFactory::new(db)
        .phone_number("+2348099990000")
        .build()
        .await?;

    let repo = UserRepository::new(db);

    let found = repo.find_by_phone("+2348099990000").await?;
    assert_eq!(found.map(|u| u.id), Some(user.id));

    let missing = repo.find_by_phone("+2348000000000").await?;
    assert!(missing.is_none());

    Ok(())
}

/// Tests listing all account ids.
///
/// Expected: every created user's id is present
#[tokio::test]
async fn all_ids_lists_every_account() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::User)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let a = factory::user::create_user(db).await?;
    let b = factory::user::create_organizer(db).await?;

    let ids = UserRepository::new(db).all_ids().await?;
    assert!(ids.contains(&a.id));
    assert!(ids.contains(&b.id));
    assert_eq!(ids.len(), 2);

    Ok(())
}
