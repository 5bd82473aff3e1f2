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
        api::ErrorDto,
        event::{CreateEventDto, EventDto, PaginatedEventsDto, UpdateEventStatusDto},
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::event::{CreateEventParams, EventFeedParams},
        router::EVENT_TAG,
        service::event::EventService,
        state::AppState,
    },
};

#[derive(Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub category: Option<String>,
    pub search: Option<String>,
}

fn default_per_page() -> u64 {
    10
}

/// Get the public feed of published events.
///
/// Paginated; optionally filtered by category (exact) and title search
/// (substring). No authentication required.
///
/// # Returns
/// - `200 OK` - Page of published events
#[utoipa::path(
    get,
    path = "/api/events/feed",
    tag = EVENT_TAG,
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 0)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default: 10)"),
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("search" = Option<String>, Query, description = "Search in event titles")
    ),
    responses(
        (status = 200, description = "Page of published events", body = PaginatedEventsDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let service = EventService::new(&state.db);

    let feed = service
        .feed(EventFeedParams {
            page: query.page,
            per_page: query.per_page,
            category: query.category,
            search: query.search,
        })
        .await?;

    Ok((StatusCode::OK, Json(feed)))
}

/// Get one event with its tiers.
///
/// # Returns
/// - `200 OK` - The event
/// - `404 Not Found` - Unknown event
#[utoipa::path(
    get,
    path = "/api/events/{event_id}",
    tag = EVENT_TAG,
    params(
        ("event_id" = i32, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "The event", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let event = EventService::new(&state.db)
        .get_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok((StatusCode::OK, Json(event)))
}

/// Create a new event in draft status.
///
/// # Access Control
/// - `Organizer` - Only organizers (and admins) can create events
///
/// # Returns
/// - `201 Created` - The draft event with its tiers
/// - `400 Bad Request` - Invalid dates or tiers
/// - `401 Unauthorized` / `403 Forbidden` - Not an organizer
#[utoipa::path(
    post,
    path = "/api/events",
    tag = EVENT_TAG,
    request_body = CreateEventDto,
    responses(
        (status = 201, description = "Event created as draft", body = EventDto),
        (status = 400, description = "Invalid event data", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an organizer", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_event(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreateEventDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Organizer])
        .await?;

    let event = EventService::new(&state.db)
        .create(CreateEventParams::from_dto(user.id, payload))
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// Transition an event's status.
///
/// Allowed transitions: draft to published, published to cancelled or
/// completed. Only the owning organizer or an admin may transition.
///
/// # Returns
/// - `200 OK` - The updated event
/// - `400 Bad Request` - Invalid transition
/// - `403 Forbidden` - Caller does not own the event
/// - `404 Not Found` - Unknown event
#[utoipa::path(
    put,
    path = "/api/events/{event_id}/status",
    tag = EVENT_TAG,
    params(
        ("event_id" = i32, Path, description = "Event ID")
    ),
    request_body = UpdateEventStatusDto,
    responses(
        (status = 200, description = "Updated event", body = EventDto),
        (status = 400, description = "Invalid transition", body = ErrorDto),
        (status = 403, description = "Caller does not own the event", body = ErrorDto),
        (status = 404, description = "Event not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn update_event_status(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<i32>,
    Json(payload): Json<UpdateEventStatusDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Organizer])
        .await?;

    let event = EventService::new(&state.db)
        .update_status(event_id, &user, &payload.status)
        .await?;

    Ok((StatusCode::OK, Json(event)))
}
