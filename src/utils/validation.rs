use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::{AppError, AppResult};

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

pub fn validate_username(username: &str) -> AppResult<()> {
    let len = username.chars().count();
    if len < 4 || len > 20 {
        return Err(AppError::Validation(
            "Username must be between 4 and 20 characters".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if len < 4 || len > 20 {
        return Err(AppError::Validation(
            "Password must be between 4 and 20 characters".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(AppError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}
