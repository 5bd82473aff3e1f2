use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

/// Errors from the ticket lifecycle: issuance preconditions, credential
/// validation, and redemption conflicts.
///
/// Conflict variants (`TicketAlreadyExists`, `TicketNotActive`, `TierSoldOut`)
/// are definite rejections: retrying the same operation can never succeed for
/// that ticket or payment. They map to 409 so callers can tell them apart from
/// validation failures and transient infrastructure errors.
#[derive(Error, Debug)]
pub enum TicketError {
    /// The referenced payment does not exist.
    #[error("Payment not found")]
    PaymentNotFound,

    /// The referenced payment exists but is not in `successful` status.
    #[error("Payment not successful")]
    PaymentNotSuccessful,

    /// The referenced payment belongs to a different user.
    #[error("Payment does not belong to user")]
    PaymentMismatch,

    /// A ticket has already been issued for this payment.
    ///
    /// Idempotency guard: a retried issuance request hits this instead of
    /// creating a second ticket.
    #[error("Ticket already issued for this payment")]
    TicketAlreadyExists,

    /// The referenced event does not exist.
    #[error("Event not found")]
    EventNotFound,

    /// The referenced tier does not exist or belongs to a different event.
    #[error("Event tier not found")]
    TierNotFound,

    /// The tier has no remaining capacity (`sold == quantity`).
    #[error("Event tier is sold out")]
    TierSoldOut,

    /// No ticket matches the presented credential.
    #[error("Ticket not found")]
    TicketNotFound,

    /// The ticket exists but is not in `active` status.
    ///
    /// Returned for any redemption attempt against a `used` or `cancelled`
    /// ticket, including the losing side of two concurrent redemptions.
    #[error("Ticket is not active")]
    TicketNotActive,

    /// Neither or both of qr_code/backup_code were supplied.
    #[error("Provide exactly one of qr_code or backup_code")]
    MissingCredential,
}

/// Converts ticket lifecycle errors into HTTP responses.
///
/// # Returns
/// - 400 Bad Request - `PaymentNotSuccessful`, `MissingCredential`
/// - 403 Forbidden - `PaymentMismatch`
/// - 404 Not Found - `PaymentNotFound`, `EventNotFound`, `TierNotFound`, `TicketNotFound`
/// - 409 Conflict - `TicketAlreadyExists`, `TicketNotActive`, `TierSoldOut`
impl IntoResponse for TicketError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::PaymentNotSuccessful | Self::MissingCredential => StatusCode::BAD_REQUEST,
            Self::PaymentMismatch => StatusCode::FORBIDDEN,
            Self::PaymentNotFound
            | Self::EventNotFound
            | Self::TierNotFound
            | Self::TicketNotFound => StatusCode::NOT_FOUND,
            Self::TicketAlreadyExists | Self::TicketNotActive | Self::TierSoldOut => {
                StatusCode::CONFLICT
            }
        };

        (
            status,
            Json(ErrorDto {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
