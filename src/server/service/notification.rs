//! Notification service: stored notifications plus live push.
//!
//! Notifications are persisted per user; when the target user has live
//! WebSocket connections the notification is also pushed through the
//! connection registry. Delivery over the registry is best-effort; the
//! stored row is the durable record.

use chrono::Utc;
use sea_orm::DatabaseConnection;

use crate::{
    model::{
        notification::{BroadcastNotificationDto, NotificationDto, NotificationListDto},
        realtime::ServerMessage,
    },
    server::{
        data::{notification::NotificationRepository, user::UserRepository},
        error::AppError,
        realtime::registry::ConnectionRegistry,
    },
};

const DEFAULT_BROADCAST_KIND: &str = "broadcast";

fn to_notification_dto(notification: entity::notification::Model) -> NotificationDto {
    NotificationDto {
        id: notification.id,
        title: notification.title,
        body: notification.body,
        kind: notification.kind,
        read: notification.read,
        created_at: notification.created_at,
    }
}

pub struct NotificationService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> NotificationService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists a user's notifications, newest first.
    ///
    /// # Arguments
    /// - `user_id`: Owner
    /// - `unread_only`: Restrict to unread notifications
    ///
    /// # Returns
    /// - `Ok(NotificationListDto)`: Notifications with total and unread counts
    /// - `Err(AppError)`: Database error
    pub async fn list(
        &self,
        user_id: i32,
        unread_only: bool,
    ) -> Result<NotificationListDto, AppError> {
        let repo = NotificationRepository::new(self.db);

        let notifications = repo.find_by_user(user_id, unread_only).await?;
        let unread = repo.count_unread(user_id).await? as usize;

        Ok(NotificationListDto {
            total: notifications.len(),
            unread,
            notifications: notifications.into_iter().map(to_notification_dto).collect(),
        })
    }

    /// Creates a notification for one user and pushes it to their live
    /// connections.
    ///
    /// # Returns
    /// - `Ok(NotificationDto)`: The stored notification
    /// - `Err(AppError)`: Database error
    pub async fn notify_user(
        &self,
        registry: &ConnectionRegistry,
        user_id: i32,
        title: String,
        body: String,
        kind: String,
    ) -> Result<NotificationDto, AppError> {
        let repo = NotificationRepository::new(self.db);
        let notification = repo.create(user_id, title, body, kind).await?;
        let dto = to_notification_dto(notification);

        registry
            .send_to_user(
                user_id,
                ServerMessage::Notification {
                    data: serde_json::json!({
                        "id": dto.id,
                        "title": dto.title,
                        "body": dto.body,
                        "kind": dto.kind,
                    }),
                    timestamp: Utc::now(),
                },
            )
            .await;

        Ok(dto)
    }

    /// Stores a broadcast notification for every account and pushes it to
    /// all live connections.
    ///
    /// # Returns
    /// - `Ok(count)`: Number of accounts the notification was stored for
    /// - `Err(AppError)`: Database error
    pub async fn broadcast(
        &self,
        registry: &ConnectionRegistry,
        dto: BroadcastNotificationDto,
    ) -> Result<usize, AppError> {
        let kind = dto
            .kind
            .unwrap_or_else(|| DEFAULT_BROADCAST_KIND.to_string());

        let user_repo = UserRepository::new(self.db);
        let notification_repo = NotificationRepository::new(self.db);

        let user_ids = user_repo.all_ids().await?;
        for user_id in &user_ids {
            notification_repo
                .create(*user_id, dto.title.clone(), dto.body.clone(), kind.clone())
                .await?;
        }

        registry
            .broadcast(ServerMessage::Notification {
                data: serde_json::json!({
                    "title": dto.title,
                    "body": dto.body,
                    "kind": kind,
                }),
                timestamp: Utc::now(),
            })
            .await;

        Ok(user_ids.len())
    }

    /// Marks one notification as read, owner-scoped.
    ///
    /// # Returns
    /// - `Ok(())`: Notification is now read
    /// - `Err(AppError::NotFound)`: No such notification for this user
    pub async fn mark_read(&self, id: i32, user_id: i32) -> Result<(), AppError> {
        let repo = NotificationRepository::new(self.db);

        if repo.mark_read(id, user_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Notification not found".to_string()))
        }
    }

    /// Marks all of a user's notifications as read.
    ///
    /// # Returns
    /// - `Ok(count)`: Number of notifications transitioned
    /// - `Err(AppError)`: Database error
    pub async fn mark_all_read(&self, user_id: i32) -> Result<u64, AppError> {
        let repo = NotificationRepository::new(self.db);
        Ok(repo.mark_all_read(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{builder::TestBuilder, factory};
    use tokio::sync::mpsc;

    /// Tests that a broadcast stores a row per user and pushes one frame to
    /// each live connection.
    ///
    /// Expected: both users have an unread notification; the connected one
    /// received a realtime frame
    #[tokio::test]
    async fn broadcast_stores_and_pushes() {
        let test = TestBuilder::new()
            .with_notification_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let alice = factory::user::create_user(db).await.unwrap();
        let bob = factory::user::create_user(db).await.unwrap();

        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(tx, Some(alice.id)).await;

        let service = NotificationService::new(db);
        let recipients = service
            .broadcast(
                &registry,
                BroadcastNotificationDto {
                    title: "Gates open".to_string(),
                    body: "Doors open at 6pm".to_string(),
                    kind: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(recipients, 2);
        assert!(matches!(
            rx.recv().await,
            Some(ServerMessage::Notification { .. })
        ));

        for user in [&alice, &bob] {
            let listing = service.list(user.id, true).await.unwrap();
            assert_eq!(listing.unread, 1);
            assert_eq!(listing.notifications[0].kind, "broadcast");
        }
    }

    /// Tests read-state transitions.
    ///
    /// Expected: mark_read clears one, mark_all_read clears the rest, and
    /// foreign notifications are not reachable
    #[tokio::test]
    async fn mark_read_is_owner_scoped() {
        let test = TestBuilder::new()
            .with_notification_tables()
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();

        let alice = factory::user::create_user(db).await.unwrap();
        let bob = factory::user::create_user(db).await.unwrap();

        let registry = ConnectionRegistry::new();
        let service = NotificationService::new(db);

        let first = service
            .notify_user(
                &registry,
                alice.id,
                "Ticket issued".to_string(),
                "See you there".to_string(),
                "ticket".to_string(),
            )
            .await
            .unwrap();
        service
            .notify_user(
                &registry,
                alice.id,
                "Event updated".to_string(),
                "New start time".to_string(),
                "event".to_string(),
            )
            .await
            .unwrap();

        // Bob cannot read Alice's notification
        let result = service.mark_read(first.id, bob.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        service.mark_read(first.id, alice.id).await.unwrap();
        assert_eq!(service.list(alice.id, true).await.unwrap().unread, 1);

        let cleared = service.mark_all_read(alice.id).await.unwrap();
        assert_eq!(cleared, 1);
        assert_eq!(service.list(alice.id, true).await.unwrap().unread, 0);
    }
}
