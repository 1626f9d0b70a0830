//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A request payload failed validation; the message is shown to the user as-is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trimmed text, or `None` when absent or blank
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate username
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::new("Username is required"));
    }

    if username.chars().count() > 64 {
        return Err(ValidationError::new(
            "Username must be at most 64 characters long",
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s\p{Cc}]+$").expect("Failed to compile username regex")
    });

    if !regex.is_match(username) {
        return Err(ValidationError::new(
            "Username cannot contain whitespace or control characters",
        ));
    }

    Ok(())
}

/// Validate an embedded employee photo
pub fn validate_photo_data(photo_data: &str) -> Result<(), ValidationError> {
    static DATA_URI_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DATA_URI_REGEX.get_or_init(|| {
        Regex::new(r"^data:image/[A-Za-z0-9.+-]+;base64,").expect("Failed to compile data URI regex")
    });

    if !regex.is_match(photo_data) {
        return Err(ValidationError::new("Photo must be an image data URI"));
    }

    Ok(())
}

/// Validate a latitude/longitude pair
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), ValidationError> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);

    if !valid {
        return Err(ValidationError::new("Invalid coordinates"));
    }

    Ok(())
}
