//! Authentication service: registration, login, and password hashing.
//!
//! Passwords are hashed with argon2id and a per-password random salt. The
//! login path never reveals whether the phone number or the password was
//! wrong.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use entity::user::UserRole;
use sea_orm::DatabaseConnection;

use crate::{
    model::user::{LoginDto, RegisterUserDto},
    server::{
        data::user::{CreateUserParams, UserRepository},
        error::{auth::AuthError, AppError},
    },
};

const MIN_PASSWORD_LENGTH: usize = 6;

/// Service providing registration and login.
pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a new account.
    ///
    /// Validates the phone number format, password length, and requested
    /// role, rejects duplicate phone numbers, then stores the account with
    /// an argon2id password hash.
    ///
    /// # Arguments
    /// - `dto`: Registration data
    ///
    /// # Returns
    /// - `Ok(Model)`: The created user
    /// - `Err(AppError)`: Validation failure, duplicate phone, or database error
    pub async fn register(&self, dto: RegisterUserDto) -> Result<entity::user::Model, AppError> {
        let role = match dto.role.as_str() {
            "attendee" => UserRole::Attendee,
            "organizer" => UserRole::Organizer,
            other => return Err(AuthError::InvalidRole(other.to_string()).into()),
        };

        if !is_valid_phone_number(&dto.phone_number) {
            return Err(AppError::BadRequest(
                "Invalid phone number format. Use +234XXXXXXXXXX or 0XXXXXXXXXX".to_string(),
            ));
        }

        if dto.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::BadRequest(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let user_repo = UserRepository::new(self.db);

        if user_repo.find_by_phone(&dto.phone_number).await?.is_some() {
            return Err(AuthError::PhoneNumberTaken.into());
        }

        let password_hash = hash_password(&dto.password)?;

        let user = user_repo
            .create(CreateUserParams {
                phone_number: dto.phone_number,
                password_hash,
                first_name: dto.first_name,
                last_name: dto.last_name,
                email: dto.email,
                state: dto.state,
                role,
            })
            .await?;

        Ok(user)
    }

    /// Authenticates a user by phone number and password.
    ///
    /// # Arguments
    /// - `dto`: Login credentials
    ///
    /// # Returns
    /// - `Ok(Model)`: The authenticated user
    /// - `Err(AppError::AuthErr(InvalidCredentials))`: Unknown phone or wrong password
    pub async fn login(&self, dto: LoginDto) -> Result<entity::user::Model, AppError> {
        let user_repo = UserRepository::new(self.db);

        let Some(user) = user_repo.find_by_phone(&dto.phone_number).await? else {
            return Err(AuthError::InvalidCredentials.into());
        };

        if !verify_password(&dto.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user)
    }
}

/// Hash a password using argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored argon2id hash.
///
/// A malformed stored hash counts as a failed verification rather than an
/// internal error, so corrupted rows cannot be probed through the login path.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return Ok(false);
    };

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Validates a Nigerian phone number: `+234XXXXXXXXXX`, `234XXXXXXXXXX` or
/// `0XXXXXXXXXX`, where the subscriber part starts with 7, 8 or 9.
fn is_valid_phone_number(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);

    let rest = if let Some(rest) = digits.strip_prefix("234") {
        rest
    } else if let Some(rest) = digits.strip_prefix('0') {
        rest
    } else {
        return false;
    };

    rest.len() == 10
        && rest.starts_with(['7', '8', '9'])
        && rest.chars().all(|c| c.is_ascii_digit())
}
