//! Notification data repository.

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

pub struct NotificationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NotificationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a notification for one user.
    ///
    /// # Returns
    /// - `Ok(Model)`: The created notification (unread)
    /// - `Err(DbErr)`: Database error
    pub async fn create(
        &self,
        user_id: i32,
        title: String,
        body: String,
        kind: String,
    ) -> Result<entity::notification::Model, DbErr> {
        entity::notification::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            title: ActiveValue::Set(title),
            body: ActiveValue::Set(body),
            kind: ActiveValue::Set(kind),
            read: ActiveValue::Set(false),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }

    /// Gets notifications for a user, newest first.
    ///
    /// # Arguments
    /// - `user_id`: Owner of the notifications
    /// - `unread_only`: When true, only unread notifications are returned
    ///
    /// # Returns
    /// - `Ok(Vec<Model>)`: The user's notifications
    /// - `Err(DbErr)`: Database error
    pub async fn find_by_user(
        &self,
        user_id: i32,
        unread_only: bool,
    ) -> Result<Vec<entity::notification::Model>, DbErr> {
        let mut query = entity::prelude::Notification::find()
            .filter(entity::notification::Column::UserId.eq(user_id))
            .order_by_desc(entity::notification::Column::CreatedAt);

        if unread_only {
            query = query.filter(entity::notification::Column::Read.eq(false));
        }

        query.all(self.db).await
    }

    /// Counts a user's unread notifications.
    ///
    /// # Returns
    /// - `Ok(count)`: Number of unread notifications
    /// - `Err(DbErr)`: Database error
    pub async fn count_unread(&self, user_id: i32) -> Result<u64, DbErr> {
        entity::prelude::Notification::find()
            .filter(entity::notification::Column::UserId.eq(user_id))
            .filter(entity::notification::Column::Read.eq(false))
            .count(self.db)
            .await
    }

    /// Marks one notification as read, owner-scoped.
    ///
    /// # Returns
    /// - `Ok(true)`: Notification existed, belonged to the user, and is now read
    /// - `Ok(false)`: No matching notification
    /// - `Err(DbErr)`: Database error
    pub async fn mark_read(&self, id: i32, user_id: i32) -> Result<bool, DbErr> {
        let result = entity::prelude::Notification::update_many()
            .col_expr(entity::notification::Column::Read, Expr::value(true))
            .filter(entity::notification::Column::Id.eq(id))
            .filter(entity::notification::Column::UserId.eq(user_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected >= 1)
    }

    /// Marks all of a user's notifications as read.
    ///
    /// # Returns
    /// - `Ok(count)`: Number of notifications transitioned to read
    /// - `Err(DbErr)`: Database error
    pub async fn mark_all_read(&self, user_id: i32) -> Result<u64, DbErr> {
        let result = entity::prelude::Notification::update_many()
            .col_expr(entity::notification::Column::Read, Expr::value(true))
            .filter(entity::notification::Column::UserId.eq(user_id))
            .filter(entity::notification::Column::Read.eq(false))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
