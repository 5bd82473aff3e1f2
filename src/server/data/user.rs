//! User data repository for database operations.
//!
//! This module provides the `UserRepository` for managing user accounts in the database.
//! It handles account creation and the lookups used by the authentication layer.

use chrono::Utc;
use entity::user::UserRole;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect,
};

pub struct CreateUserParams {
    pub phone_number: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub state: String,
    pub role: UserRole,
}

/// Repository providing database operations for user management.
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new user account.
    ///
    /// # Arguments
    /// - `params` - Account fields including the already-hashed password
    ///
    /// # Returns
    /// - `Ok(Model)`: The created user
    /// - `Err(DbErr)`: Database error (including unique violation on phone number)
    pub async fn create(&self, params: CreateUserParams) -> Result<entity::user::Model, DbErr> {
        entity::user::ActiveModel {
            id: ActiveValue::NotSet,
            phone_number: ActiveValue::Set(params.phone_number),
            password_hash: ActiveValue::Set(params.password_hash),
            first_name: ActiveValue::Set(params.first_name),
            last_name: ActiveValue::Set(params.last_name),
            email: ActiveValue::Set(params.email),
            state: ActiveValue::Set(params.state),
            role: ActiveValue::Set(params.role),
            is_verified: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }

    /// Finds a user by primary key.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: User found
    /// - `Ok(None)`: No user with that id
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_id(&self, id: i32) -> Result<Option<entity::user::Model>, DbErr> {
        entity::prelude::User::find_by_id(id).one(self.db).await
    }

    /// Finds a user by phone number.
    ///
    /// Used by login and by registration's duplicate check.
    ///
    /// # Returns
    /// - `Ok(Some(Model))`: User found
    /// - `Ok(None)`: No user with that phone number
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_phone(
        &self,
        phone_number: &str,
    ) -> Result<Option<entity::user::Model>, DbErr> {
        entity::prelude::User::find()
            .filter(entity::user::Column::PhoneNumber.eq(phone_number))
            .one(self.db)
            .await
    }

    /// Returns the ids of all users.
    ///
    /// Used by the broadcast notification path to persist one notification
    /// per account.
    ///
    /// # Returns
    /// - `Ok(Vec<i32>)`: All user ids
    /// - `Err(DbErr)`: Database error
    pub async fn all_ids(&self) -> Result<Vec<i32>, DbErr> {
        entity::prelude::User::find()
            .select_only()
            .column(entity::user::Column::Id)
            .into_tuple()
            .all(self.db)
            .await
    }
}
