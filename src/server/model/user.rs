use entity::user::UserRole;

use crate::model::user::UserDto;

/// String form of a role as it appears in API responses.
pub fn role_as_str(role: &UserRole) -> &'static str {
    match role {
        UserRole::Attendee => "attendee",
        UserRole::Organizer => "organizer",
        UserRole::Admin => "admin",
    }
}

/// Converts a user entity into its API representation.
///
/// The password hash never crosses this boundary.
pub fn user_to_dto(user: entity::user::Model) -> UserDto {
    UserDto {
        id: user.id,
        phone_number: user.phone_number,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        state: user.state,
        role: role_as_str(&user.role).to_string(),
        is_verified: user.is_verified,
        created_at: user.created_at,
    }
}

/// Display name of a ticket holder as shown to verification staff.
pub fn display_name(user: &entity::user::Model) -> String {
    format!("{} {}", user.first_name, user.last_name)
        .trim()
        .to_string()
}
