use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::model::api::ErrorDto;

#[derive(Error, Debug)]
pub enum AuthError {
    /// No authenticated user in the session.
    ///
    /// The request requires a logged-in user but the session carries no user id.
    /// Results in a 401 Unauthorized response.
    #[error("No authenticated user in session")]
    UserNotInSession,

    /// Session references a user that no longer exists.
    ///
    /// The session carries a user id that cannot be found in the database,
    /// typically after account deletion. Results in a 401 Unauthorized response.
    #[error("User {0} from session not found in database")]
    UserNotInDatabase(i32),

    /// User lacks the required role for this operation.
    ///
    /// Results in a 403 Forbidden response. The detail string is logged
    /// server-side only.
    #[error("Access denied for user {0}: {1}")]
    AccessDenied(i32, String),

    /// Login failed due to an unknown phone number or wrong password.
    ///
    /// Results in a 401 Unauthorized response with a message that does not
    /// reveal which of the two was wrong.
    #[error("Invalid phone number or password")]
    InvalidCredentials,

    /// Registration attempted with a phone number that is already registered.
    ///
    /// Results in a 409 Conflict response.
    #[error("Phone number is already registered")]
    PhoneNumberTaken,

    /// Registration attempted with a role other than attendee or organizer.
    ///
    /// Results in a 400 Bad Request response.
    #[error("Invalid role '{0}': must be 'attendee' or 'organizer'")]
    InvalidRole(String),
}

/// Converts authentication errors into HTTP responses.
///
/// Maps authentication errors to appropriate HTTP status codes and user-facing
/// messages. Authorization details are logged for diagnostics while the client
/// receives a generic message to avoid information leakage.
///
/// # Returns
/// - 400 Bad Request - For invalid registration data
/// - 401 Unauthorized - For missing or stale sessions and failed logins
/// - 403 Forbidden - For insufficient role permissions
/// - 409 Conflict - For duplicate phone number registration
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::UserNotInSession | Self::UserNotInDatabase(_) => {
                (StatusCode::UNAUTHORIZED, "Not logged in".to_string())
            }
            Self::AccessDenied(user_id, detail) => {
                tracing::debug!("Access denied for user {}: {}", user_id, detail);
                (StatusCode::FORBIDDEN, "Access denied".to_string())
            }
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            Self::PhoneNumberTaken => (StatusCode::CONFLICT, self.to_string()),
            Self::InvalidRole(_) => (StatusCode::BAD_REQUEST, self.to_string()),
        };

        (status, Json(ErrorDto { error: message })).into_response()
    }
}
