use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    model::{
        api::{ErrorDto, MessageDto},
        notification::{BroadcastNotificationDto, NotificationListDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        router::NOTIFICATION_TAG,
        service::notification::NotificationService,
        state::AppState,
    },
};

#[derive(Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// List the caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = NOTIFICATION_TAG,
    params(
        ("unread_only" = Option<bool>, Query, description = "Only unread notifications")
    ),
    responses(
        (status = 200, description = "The caller's notifications", body = NotificationListDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let listing = NotificationService::new(&state.db)
        .list(user.id, query.unread_only)
        .await?;

    Ok((StatusCode::OK, Json(listing)))
}

/// Mark one notification as read.
///
/// # Returns
/// - `200 OK` - Notification marked read
/// - `404 Not Found` - No such notification for this user
#[utoipa::path(
    put,
    path = "/api/notifications/{notification_id}/read",
    tag = NOTIFICATION_TAG,
    params(
        ("notification_id" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked read", body = MessageDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 404, description = "Notification not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    session: Session,
    Path(notification_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    NotificationService::new(&state.db)
        .mark_read(notification_id, user.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageDto {
            message: "Notification marked as read".to_string(),
        }),
    ))
}

/// Mark all of the caller's notifications as read.
#[utoipa::path(
    put,
    path = "/api/notifications/read-all",
    tag = NOTIFICATION_TAG,
    responses(
        (status = 200, description = "All notifications marked read", body = MessageDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let count = NotificationService::new(&state.db)
        .mark_all_read(user.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageDto {
            message: format!("{} notifications marked as read", count),
        }),
    ))
}

/// Store a notification for every account and push it to live connections.
///
/// # Access Control
/// - `Admin` - Only admins can broadcast notifications
#[utoipa::path(
    post,
    path = "/api/notifications/broadcast",
    tag = NOTIFICATION_TAG,
    request_body = BroadcastNotificationDto,
    responses(
        (status = 200, description = "Broadcast stored and pushed", body = MessageDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn broadcast_notification(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BroadcastNotificationDto>,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Admin])
        .await?;

    let recipients = NotificationService::new(&state.db)
        .broadcast(&state.registry, payload)
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageDto {
            message: format!("Broadcast stored for {} users", recipients),
        }),
    ))
}
