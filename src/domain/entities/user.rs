use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use validator::Validate;
use uuid::Uuid;

use crate::domain::password::{validate_password_strength, MIN_PASSWORD_LENGTH};


#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserInsert {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(
        length(min = "MIN_PASSWORD_LENGTH", message = "Password must be at least 8 characters long"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
}

impl NewUser {
    /// Emails are stored trimmed and lowercased so uniqueness is case-insensitive.
    pub fn normalized(self) -> Self {
        NewUser {
            email: normalize_email(&self.email),
            password: self.password,
        }
    }

    pub fn prepare_for_insert(&self, password_hash: String) -> UserInsert {
        UserInsert {
            email: self.email.clone(),
            password_hash,
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NewUserResponse {
    pub id: Uuid,
    pub email: String,
}

impl From<User> for NewUserResponse {
    fn from(user: User) -> Self {
        NewUserResponse {
            id: user.id,
            email: user.email,
        }
    }
}
