use validator::ValidationError;

pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Character-class rules for new passwords. Length is checked by the `length` validator.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());

    let message = match (has_upper, has_lower) {
        (true, true) => return Ok(()),
        (false, true) => "Password must contain at least one uppercase letter",
        (true, false) => "Password must contain at least one lowercase letter",
        (false, false) => "Password must contain at least one uppercase and one lowercase letter",
    };

    let mut error = ValidationError::new("password_complexity");
    error.message = Some(message.into());
    Err(error)
}
