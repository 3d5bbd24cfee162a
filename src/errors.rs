use std::borrow::Cow;
use std::fmt;

use actix_multipart::MultipartError;
use actix_web::{
    error::{JsonPayloadError, PathError, PayloadError, QueryPayloadError, ResponseError},
    http::StatusCode,
    HttpResponse
};
use jsonwebtoken::errors::{ErrorKind, Error as JwtError};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

const INTERNAL_ERROR_LABEL: &str = "Internal Server Error";
const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong on our side. Please try again later.";

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    InvalidInput(String),
    UploadPolicy(String),
    NotFound(String),
    Conflict(String),
    Auth(AuthError),
    ImageService(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::UploadPolicy(msg) => write!(f, "Upload rejected: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Auth(err) => write!(f, "Authentication failed: {}", err),
            AppError::ImageService(msg) => write!(f, "Image service error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Label used in the `error` field of the response envelope.
    pub fn label(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "ValidationError",
            AppError::InvalidInput(_) => "BadRequest",
            AppError::UploadPolicy(_) => "UploadPolicyError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::Conflict(_) => "ConflictError",
            AppError::Auth(err) => err.label(),
            AppError::ImageService(_) | AppError::InternalError(_) => INTERNAL_ERROR_LABEL,
        }
    }

    /// Client-facing message. Internal failures never expose their detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(_) => "Request validation failed".to_string(),
            AppError::InvalidInput(msg)
            | AppError::UploadPolicy(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Auth(err) => err.public_message(),
            AppError::ImageService(_) | AppError::InternalError(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed with an internal error");
        }

        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": self.label(),
                    "message": self.public_message(),
                    "errors": errors
                })
            }
            _ => error_envelope(self.label(), &self.public_message()),
        };
        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::UploadPolicy(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Auth(err) => err.status_code(),
            AppError::ImageService(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_envelope(label: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "error": label,
        "message": message
    })
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23505")) => {
                AppError::Conflict("Database conflict occurred".into())
            }
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23503")) => {
                AppError::Conflict("Foreign key violation".into())
            }
            _ => AppError::InternalError(format!("Database error: {}", err))
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::InternalError(format!("Migration error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ImageService(err.to_string())
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::DuplicateField(_) => {
                AppError::UploadPolicy("Only one file may be uploaded per request".to_string())
            }
            MultipartError::UnknownField(name) => {
                AppError::UploadPolicy(format!(
                    "Unexpected field `{}`: send the image as a single `file` part", name
                ))
            }
            MultipartError::Payload(PayloadError::Overflow) => {
                AppError::UploadPolicy("File exceeds the maximum upload size".to_string())
            }
            MultipartError::ContentTypeMissing
            | MultipartError::ContentTypeParse
            | MultipartError::ContentTypeIncompatible => {
                AppError::UploadPolicy("Request must be multipart/form-data".to_string())
            }
            other => AppError::UploadPolicy(format!("Invalid multipart payload: {}", other)),
        }
    }
}

impl From<JsonPayloadError> for AppError {
    fn from(err: JsonPayloadError) -> Self {
        AppError::InvalidInput(format!("Invalid JSON payload: {}", err))
    }
}

impl From<QueryPayloadError> for AppError {
    fn from(err: QueryPayloadError) -> Self {
        AppError::InvalidInput(format!("Invalid query string: {}", err))
    }
}

impl From<PathError> for AppError {
    fn from(err: PathError) -> Self {
        AppError::InvalidInput(format!("Invalid path parameter: {}", err))
    }
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum AuthError {
    #[display("Invalid token")]
    InvalidToken,

    #[display("Token has expired")]
    TokenExpired,

    #[display("Missing or malformed bearer token")]
    MissingCredentials,

    #[display("Invalid credentials")]
    WrongCredentials,

    #[display("Invalid user id in token")]
    InvalidUserId,

    #[display("Token creation error")]
    TokenCreation,
}

impl AuthError {
    fn label(&self) -> &'static str {
        match self {
            AuthError::TokenCreation => INTERNAL_ERROR_LABEL,
            _ => "Unauthorized",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AuthError::TokenCreation => INTERNAL_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "Authentication failed with an internal error");
        }
        HttpResponse::build(self.status_code())
            .json(error_envelope(self.label(), &self.public_message()))
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidUserId => StatusCode::UNAUTHORIZED,
            AuthError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password parameters: {_0}")]
    InvalidParameters(String),

    #[display("Password hashing failed: {_0}")]
    HashingError(String),

    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
