use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path identifier, mapping malformed input to a 400.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::InvalidInput("Invalid asset id".to_string()))
}
