use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use entity::user::UserRole;
use tower_sessions::Session;

use crate::{
    model::{
        api::{ErrorDto, MessageDto},
        realtime::ServerMessage,
        ticket::{
            IssueTicketDto, MyTicketsDto, RedeemTicketDto, RedemptionDto, ScanRecordDto,
            TicketDto, TicketVerificationDto, VerifyTicketDto,
        },
    },
    server::{
        error::AppError,
        middleware::auth::{AuthGuard, Permission},
        model::ticket::{IssueTicketParams, RedeemTicketParams, TicketCredential},
        realtime::event_room,
        router::TICKET_TAG,
        service::{notification::NotificationService, ticket::TicketService},
        state::AppState,
    },
};

/// Issue a ticket for a confirmed payment.
///
/// Consumes a successful payment into exactly one ticket. Retrying a
/// duplicate request yields 409 instead of a second ticket.
///
/// # Returns
/// - `201 Created` - The issued ticket including QR token and backup code
/// - `400 Bad Request` - Payment not successful
/// - `403 Forbidden` - Payment belongs to another user
/// - `404 Not Found` - Unknown payment, event, or tier
/// - `409 Conflict` - Ticket already issued for this payment, or tier sold out
#[utoipa::path(
    post,
    path = "/api/tickets/issue",
    tag = TICKET_TAG,
    request_body = IssueTicketDto,
    responses(
        (status = 201, description = "Ticket issued", body = TicketDto),
        (status = 400, description = "Payment not successful", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Payment belongs to another user", body = ErrorDto),
        (status = 404, description = "Payment, event or tier not found", body = ErrorDto),
        (status = 409, description = "Already issued or tier sold out", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn issue_ticket(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<IssueTicketDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let ticket = TicketService::new(&state.db)
        .issue(IssueTicketParams {
            payment_id: payload.payment_id,
            event_id: payload.event_id,
            tier_id: payload.tier_id,
            user_id: user.id,
            cultural_selections: payload.cultural_selections,
        })
        .await?;

    // Purchase confirmation; the ticket itself is already committed, so a
    // notification failure must not fail the request
    let event_title = ticket
        .event_title
        .clone()
        .unwrap_or_else(|| "your event".to_string());
    if let Err(e) = NotificationService::new(&state.db)
        .notify_user(
            &state.registry,
            user.id,
            "Ticket issued".to_string(),
            format!("Your ticket for {} is ready", event_title),
            "ticket".to_string(),
        )
        .await
    {
        tracing::warn!("Failed to store issuance notification: {}", e);
    }

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// List the caller's tickets with event/tier details and counts.
#[utoipa::path(
    get,
    path = "/api/tickets/my-tickets",
    tag = TICKET_TAG,
    responses(
        (status = 200, description = "The caller's tickets", body = MyTicketsDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn my_tickets(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let tickets = TicketService::new(&state.db).my_tickets(user.id).await?;

    Ok((StatusCode::OK, Json(tickets)))
}

/// Get one ticket, owner-scoped.
#[utoipa::path(
    get,
    path = "/api/tickets/{ticket_id}",
    tag = TICKET_TAG,
    params(
        ("ticket_id" = i32, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "The ticket", body = TicketDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 404, description = "Ticket not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    session: Session,
    Path(ticket_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let ticket = TicketService::new(&state.db)
        .get_for_user(ticket_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))?;

    Ok((StatusCode::OK, Json(ticket)))
}

/// Verify a ticket credential without redeeming it.
///
/// Read-only check for front-of-house staff: reports validity, holder and
/// tier details, and (for already-used tickets) the full scan history.
/// Exactly one of `qr_code` / `backup_code` must be supplied.
///
/// # Access Control
/// - `Organizer` - Verification staff endpoints require the organizer role
///
/// # Returns
/// - `200 OK` - Verification outcome (valid or invalid with reason)
#[utoipa::path(
    post,
    path = "/api/tickets/verify",
    tag = TICKET_TAG,
    request_body = VerifyTicketDto,
    responses(
        (status = 200, description = "Verification outcome", body = TicketVerificationDto),
        (status = 400, description = "Missing or ambiguous credential", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an organizer", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn verify_ticket(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<VerifyTicketDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Organizer])
        .await?;

    let credential = TicketCredential::try_from(payload).map_err(AppError::from)?;

    let outcome =
        TicketService::with_verify_scan_recording(&state.db, state.config.record_verify_scans)
            .verify(credential, user.id)
            .await?;

    Ok((StatusCode::OK, Json(outcome)))
}

/// Redeem a ticket at the point of entry.
///
/// The single mutating operation of the ticket lifecycle: transitions the
/// ticket `active -> used`, stamps the redeeming agent and location, appends
/// one scan record, and notifies live subscribers of the event's room. Of
/// several concurrent attempts against one ticket, exactly one succeeds.
///
/// # Access Control
/// - `Organizer` - Redemption requires the organizer role
///
/// # Returns
/// - `200 OK` - Redemption succeeded
/// - `404 Not Found` - Unknown credential
/// - `409 Conflict` - Ticket already used or cancelled
#[utoipa::path(
    post,
    path = "/api/tickets/redeem",
    tag = TICKET_TAG,
    request_body = RedeemTicketDto,
    responses(
        (status = 200, description = "Redemption succeeded", body = RedemptionDto),
        (status = 400, description = "Missing or ambiguous credential", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 403, description = "Not an organizer", body = ErrorDto),
        (status = 404, description = "Ticket not found", body = ErrorDto),
        (status = 409, description = "Ticket already used or cancelled", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn redeem_ticket(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<RedeemTicketDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session)
        .require(&[Permission::Organizer])
        .await?;

    let params = RedeemTicketParams::from_dto(user.id, payload).map_err(AppError::from)?;

    let redeemed = TicketService::new(&state.db).redeem(params).await?;

    // Best-effort occupancy update for live dashboards watching this event
    state
        .registry
        .send_to_room(
            &event_room(redeemed.event_id),
            ServerMessage::EventUpdate {
                event_id: redeemed.event_id,
                update_type: "ticket_redeemed".to_string(),
                data: serde_json::json!({
                    "ticket_id": redeemed.ticket_id,
                    "tier_id": redeemed.tier_id,
                }),
                timestamp: Utc::now(),
            },
        )
        .await;

    Ok((
        StatusCode::OK,
        Json(RedemptionDto {
            success: true,
            ticket_id: redeemed.ticket_id,
            message: "Ticket redeemed successfully".to_string(),
        }),
    ))
}

/// Get the scan history of a ticket.
///
/// Attendees see their own tickets' history; organizers and admins see any.
///
/// # Returns
/// - `200 OK` - Scan records, newest first
/// - `404 Not Found` - Unknown ticket (or not the caller's)
#[utoipa::path(
    get,
    path = "/api/tickets/{ticket_id}/scan-history",
    tag = TICKET_TAG,
    params(
        ("ticket_id" = i32, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Scan records", body = Vec<ScanRecordDto>),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 404, description = "Ticket not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn scan_history(
    State(state): State<AppState>,
    session: Session,
    Path(ticket_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let service = TicketService::new(&state.db);

    if user.role == UserRole::Attendee
        && service.get_for_user(ticket_id, user.id).await?.is_none()
    {
        return Err(AppError::NotFound("Ticket not found".to_string()));
    }

    let history = service.scan_history(ticket_id).await?;

    Ok((StatusCode::OK, Json(history)))
}

/// Cancel one of the caller's active tickets.
///
/// # Returns
/// - `200 OK` - Ticket cancelled
/// - `404 Not Found` - No such ticket for this user
/// - `409 Conflict` - Ticket already used or cancelled
#[utoipa::path(
    post,
    path = "/api/tickets/{ticket_id}/cancel",
    tag = TICKET_TAG,
    params(
        ("ticket_id" = i32, Path, description = "Ticket ID")
    ),
    responses(
        (status = 200, description = "Ticket cancelled", body = MessageDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 404, description = "Ticket not found", body = ErrorDto),
        (status = 409, description = "Ticket already used or cancelled", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn cancel_ticket(
    State(state): State<AppState>,
    session: Session,
    Path(ticket_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    TicketService::new(&state.db)
        .cancel(ticket_id, user.id)
        .await?;

    Ok((
        StatusCode::OK,
        Json(MessageDto {
            message: "Ticket cancelled".to_string(),
        }),
    ))
}
