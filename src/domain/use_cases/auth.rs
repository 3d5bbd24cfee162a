use once_cell::sync::Lazy;
use uuid::Uuid;
use validator::Validate;

use crate::entities::token::AuthResponse;
use crate::entities::user::{normalize_email, LoginUser, NewUser, NewUserResponse, User};
use crate::errors::{AppError, AuthError};
use crate::interfaces::repositories::user::UserRepository;
use crate::auth::password::{hash_password, verify_password};
use crate::repositories::token::TokenServiceRepository;
use crate::use_cases::extractors::AuthUser;

// Verified against when the email is unknown so both failure paths cost one hash check.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("dummy-password-for-timing").ok());

pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub user_repo: R,
    pub token_service: T,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenServiceRepository,
{
    pub fn new(user_repo: R, token_service: T) -> Self {
        AuthHandler {
            user_repo,
            token_service
        }
    }

    /// Registers a new user after validation and password hashing
    pub async fn register(&self, request: NewUser) -> Result<NewUserResponse, AppError> {
        let request = request.normalized();
        request.validate()?;

        let hashed_password = hash_password(&request.password)?;
        let user_insert = request.prepare_for_insert(hashed_password);

        let user = self.user_repo.create_user(&user_insert).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(NewUserResponse::from(user))
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, request: LoginUser) -> Result<AuthResponse, AppError> {
        let email = normalize_email(&request.email);

        let Some(user) = self.user_repo.get_user_by_email(&email).await? else {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                let _ = verify_password(&request.password, dummy);
            }
            tracing::warn!("Login attempt for unknown email");
            return Err(AuthError::WrongCredentials.into());
        };

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|e| {
                tracing::error!(user_id = %user.id, "Stored password hash unusable: {}", e);
                AuthError::WrongCredentials
            })?;
        if !is_password_valid {
            tracing::warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::WrongCredentials.into());
        }

        let response = self.create_auth_response(&user)?;

        tracing::info!(user_id = %user.id, "User logged in successfully");
        Ok(response)
    }

    pub fn create_auth_response(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let access_token = self.token_service.create_jwt(user)
            .map_err(|e| {
                tracing::warn!("Failed to create JWT: {}", e);
                AuthError::TokenCreation
            })?;

        Ok(AuthResponse::new(access_token))
    }

    /// Verifies a bearer token and resolves the identity it carries.
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.token_service.decode_jwt(token)?.claims;
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::InvalidUserId)?;

        Ok(AuthUser { id, email: claims.email })
    }
}
