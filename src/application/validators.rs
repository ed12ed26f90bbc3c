use validator::ValidateEmail;

use crate::app_error::{AppError, AppResult};

const MAX_PUB_KEY_LEN: usize = 256;
const MAX_EXTERNAL_ID_LEN: usize = 32;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Trim and lowercase an email, rejecting anything that is not an address.
pub fn normalize_email(raw: &str) -> AppResult<String> {
    if !is_valid_email(raw) {
        return Err(AppError::InvalidInput("Invalid email address".into()));
    }
    Ok(raw.trim().to_lowercase())
}

/// Unwrap a required request field, treating blank strings as missing.
pub fn require(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::InvalidInput(format!("{field} is required"))),
    }
}

pub fn is_valid_pub_key(key: &str) -> bool {
    is_opaque_token(key, MAX_PUB_KEY_LEN)
}

/// Provider account ids are numeric strings.
pub fn is_valid_external_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_EXTERNAL_ID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

/// Non-empty, bounded, and free of whitespace and control characters.
fn is_opaque_token(value: &str, max_len: usize) -> bool {
    !value.is_empty()
        && value.len() <= max_len
        && !value.chars().any(|c| c.is_whitespace() || c.is_control())
}
