use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tower_sessions::Session;

use crate::{
    model::{
        api::ErrorDto,
        payment::{ConfirmPaymentDto, CreatePaymentDto, PaymentDto},
    },
    server::{
        error::AppError, middleware::auth::AuthGuard, router::PAYMENT_TAG,
        service::payment::PaymentService, state::AppState,
    },
};

/// Create a pending payment for one tier purchase.
///
/// The amount is taken from the tier's current price. The returned reference
/// identifies the payment to the gateway and to the confirm endpoint.
///
/// # Returns
/// - `201 Created` - The pending payment
/// - `400 Bad Request` - Event not open for sales
/// - `404 Not Found` - Unknown event or tier
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = PAYMENT_TAG,
    request_body = CreatePaymentDto,
    responses(
        (status = 201, description = "Pending payment created", body = PaymentDto),
        (status = 400, description = "Event not open for sales", body = ErrorDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 404, description = "Event or tier not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn create_payment(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<CreatePaymentDto>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let payment = PaymentService::new(&state.db)
        .create(user.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Confirm or fail a pending payment (gateway webhook style).
///
/// The transition out of `pending` happens at most once; replays of the same
/// outcome are answered idempotently. A configured gateway is consulted
/// first, and its unavailability surfaces as 503 so the gateway retries.
///
/// # Returns
/// - `200 OK` - The settled payment
/// - `400 Bad Request` - Unknown outcome or conflicting replay
/// - `404 Not Found` - Unknown reference
/// - `503 Service Unavailable` - Gateway unreachable; retry later
#[utoipa::path(
    post,
    path = "/api/payments/confirm",
    tag = PAYMENT_TAG,
    request_body = ConfirmPaymentDto,
    responses(
        (status = 200, description = "Settled payment", body = PaymentDto),
        (status = 400, description = "Unknown outcome or conflicting replay", body = ErrorDto),
        (status = 404, description = "Payment not found", body = ErrorDto),
        (status = 503, description = "Gateway unreachable", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmPaymentDto>,
) -> Result<impl IntoResponse, AppError> {
    let payment = PaymentService::new(&state.db)
        .confirm(&state.gateway, payload)
        .await?;

    Ok((StatusCode::OK, Json(payment)))
}

/// List the caller's payments, newest first.
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = PAYMENT_TAG,
    responses(
        (status = 200, description = "The caller's payments", body = Vec<PaymentDto>),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn list_payments(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let payments = PaymentService::new(&state.db).list_for_user(user.id).await?;

    Ok((StatusCode::OK, Json(payments)))
}

/// Get one payment, owner-scoped.
///
/// # Returns
/// - `200 OK` - The payment
/// - `404 Not Found` - No such payment for this user
#[utoipa::path(
    get,
    path = "/api/payments/{payment_id}",
    tag = PAYMENT_TAG,
    params(
        ("payment_id" = i32, Path, description = "Payment ID")
    ),
    responses(
        (status = 200, description = "The payment", body = PaymentDto),
        (status = 401, description = "Not logged in", body = ErrorDto),
        (status = 404, description = "Payment not found", body = ErrorDto),
        (status = 500, description = "Internal server error", body = ErrorDto)
    ),
)]
pub async fn get_payment(
    State(state): State<AppState>,
    session: Session,
    Path(payment_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthGuard::new(&state.db, &session).require(&[]).await?;

    let payment = PaymentService::new(&state.db)
        .get_for_user(payment_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))?;

    Ok((StatusCode::OK, Json(payment)))
}
