use entity::user::UserRole;
use sea_orm::DatabaseConnection;
use tower_sessions::Session;

use crate::server::{
    data::user::UserRepository,
    error::{auth::AuthError, AppError},
    middleware::session::AuthSession,
};

/// Permission required to access an endpoint.
pub enum Permission {
    /// Requires the admin role.
    Admin,
    /// Requires the organizer role; admins also pass.
    Organizer,
}

/// Guard that resolves the session user and checks role permissions.
///
/// Loads the authenticated user from the session and database, then verifies
/// every requested permission. Controllers call `require` at the top of each
/// protected handler and receive the resolved user model on success.
pub struct AuthGuard<'a> {
    db: &'a DatabaseConnection,
    session: &'a Session,
}

impl<'a> AuthGuard<'a> {
    pub fn new(db: &'a DatabaseConnection, session: &'a Session) -> Self {
        Self { db, session }
    }

    /// Resolves the session user and verifies the requested permissions.
    ///
    /// # Arguments
    /// - `permissions` - Permissions that must all hold for the user
    ///
    /// # Returns
    /// - `Ok(Model)` - The authenticated user satisfying all permissions
    /// - `Err(AppError::AuthErr)` - Not logged in, user missing, or role check failed
    pub async fn require(
        &self,
        permissions: &[Permission],
    ) -> Result<entity::user::Model, AppError> {
        let user_repo = UserRepository::new(self.db);

        let Some(user_id) = AuthSession::new(self.session).get_user_id().await? else {
            return Err(AuthError::UserNotInSession.into());
        };

        let Some(user) = user_repo.find_by_id(user_id).await? else {
            return Err(AuthError::UserNotInDatabase(user_id).into());
        };

        for permission in permissions {
            match permission {
                Permission::Admin => {
                    if user.role != UserRole::Admin {
                        return Err(AuthError::AccessDenied(
                            user_id,
                            "admin role required".to_string(),
                        )
                        .into());
                    }
                }
                Permission::Organizer => {
                    if user.role != UserRole::Organizer && user.role != UserRole::Admin {
                        return Err(AuthError::AccessDenied(
                            user_id,
                            "organizer role required".to_string(),
                        )
                        .into());
                    }
                }
            }
        }

        Ok(user)
    }
}
