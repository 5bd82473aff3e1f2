use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct NotificationDto {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct NotificationListDto {
    pub notifications: Vec<NotificationDto>,
    pub total: usize,
    pub unread: usize,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, ToSchema)]
pub struct BroadcastNotificationDto {
    pub title: String,
    pub body: String,
    /// Notification kind, e.g. "announcement". Defaults to "broadcast".
    pub kind: Option<String>,
}
