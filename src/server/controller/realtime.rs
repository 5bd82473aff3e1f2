use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use entity::user::UserRole;
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        realtime::{
            BroadcastMessageDto, BroadcastResultDto, NotifyEventDto, RegistryStatsDto,
            ServerMessage,
        },
    },
    server::{
        data::event::EventRepository,
        error::{auth::AuthError, AppError},
        middleware::{
            auth::{AuthGuard, Permission},
            session::AuthSession,
        },
        realtime::{event_room, socket},
        router::REALTIME_TAG,
        state::AppState,
    },
};

/// Upgrade to the real-time WebSocket channel.
///
/// Anonymous connections are accepted; a logged-in session attaches the user
/// id so personal notifications and event subscriptions work. The connection
/// identifier is server-generated and returned in the
/// `connection_established` frame.
pub async fn websocket(
    State(state): State<AppState>,
    session: Session,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let user_id = AuthSession::new(&session).get_user_id().await?;

    Ok(ws.on_upgrade(move |socket| socket::run(socket, state.registry.clone(), user_id)))
}

/// Broadcast a message to every connected client.
///
/// # Access Control
/// - `Admin` - Only admins can broadcast
#[utoipa::path(
    post,
    path = "/api/realtime/broadcast",
    tag = REALTIME_TAG,
    request_body = BroadcastMessageDto,
    responses(
        (status = 200, description = "Message broadcast", body = BroadcastResultDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn broadcast(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<BroadcastMessageDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Admin])
        .await?;

    let recipients = state
        .registry
        .broadcast(ServerMessage::Broadcast {
            message: payload.message,
            sender: user.id,
            timestamp: Utc::now(),
        })
        .await;

    Ok((StatusCode::OK, Json(BroadcastResultDto { recipients })))
}

/// Notify subscribers of an event about an update.
///
/// Sends an `event_update` frame to room `event_<id>`. Allowed for admins
/// and for the organizer who owns the event.
///
/// # Returns
/// - `200 OK` - Update sent to the room (possibly zero subscribers)
/// - `403 Forbidden` - Caller does not own the event
/// - `404 Not Found` - Unknown event
#[utoipa::path(
    post,
    path = "/api/realtime/events/{event_id}/notify",
    tag = REALTIME_TAG,
    params(
        ("event_id" = i32, Path, description = "Event ID")
    ),
    request_body = NotifyEventDto,
    responses(
        (status = 200, description = "Update sent", body = BroadcastResultDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Caller does not own the event", body = ErrorDto),
        (status = 404, description = "Event not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn notify_event_update(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<i32>,
    Json(payload): Json<NotifyEventDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Organizer])
        .await?;

    let event = EventRepository::new(&state.db)
        .get_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if event.organizer_id != user.id && user.role != UserRole::Admin {
        return Err(AuthError::AccessDenied(
            user.id,
            format!("user does not own event {}", event_id),
        )
        .into());
    }

    let recipients = state
        .registry
        .send_to_room(
            &event_room(event_id),
            ServerMessage::EventUpdate {
                event_id,
                update_type: payload.update_type,
                data: payload.data,
                timestamp: Utc::now(),
            },
        )
        .await;

    Ok((StatusCode::OK, Json(BroadcastResultDto { recipients })))
}

/// Get live connection statistics.
///
/// # Access Control
/// - `Admin` - Only admins can inspect connections
#[utoipa::path(
    get,
    path = "/api/realtime/connections",
    tag = REALTIME_TAG,
    responses(
        (status = 200, description = "Connection statistics", body = RegistryStatsDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an admin", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn connection_stats(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let _ = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Admin])
        .await?;

    let stats = state.registry.stats().await;

    Ok((StatusCode::OK, Json(stats)))
}
