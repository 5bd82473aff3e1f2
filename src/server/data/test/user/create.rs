use super::*;

/// Tests creating a user account.
///
/// Verifies that the repository stores all account fields and that new
/// accounts start unverified.
///
/// Expected: Ok with persisted fields
#[tokio::test]
async fn creates_user() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::User)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserRepository::new(db);
    let user = repo
        .create(CreateUserParams {
            phone_number: "+2348011112222".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Obi".to_string(),
            email: Some("ada@example.com".to_string()),
            state: "Lagos".to_string(),
            role: UserRole::Organizer,
        })
        .await?;

    assert_eq!(user.phone_number, "+2348011112222");
    assert_eq!(user.role, UserRole::Organizer);
    assert!(!user.is_verified);

    // Verify the row exists in the database
    let stored = repo.find_by_id(user.id).await?;
    assert_eq!(stored.map(|u| u.email), Some(Some("ada@example.com".to_string())));

    Ok(())
}

/// Tests that the unique index rejects a duplicate phone number.
///
/// Expected: Err on the second insert with the same phone number
#[tokio::test]
async fn duplicate_phone_number_fails() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(entity::prelude::User)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = UserRepository::new(db);
    let params = || CreateUserParams {
        phone_number: "+2348011112222".to_string(),
        password_hash: "$argon2id$fake".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Obi".to_string(),
        email: None,
        state: "Lagos".to_string(),
        role: UserRole::Attendee,
    };

    repo.create(params()).await?;
    assert!(repo.create(params()).await.is_err());

    Ok(())
}
