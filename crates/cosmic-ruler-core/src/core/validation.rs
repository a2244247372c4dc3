// crates/cosmic-ruler-core/src/core/validation.rs
// ============================================================================
// Module: Input Validation
// Description: Length, range, and charset checks for caller-supplied fields.
// Purpose: Reject malformed input before it reaches a store.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every check returns a [`ValidationError`] whose message is safe to show to
//! the caller. Text lengths are counted in Unicode scalar values, not bytes,
//! so `"张三"` is two characters long.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum characters in a measured name, banned value, or trigger.
pub const NAME_MAX_CHARS: usize = 100;
/// Maximum characters in a ban reason or easter-egg note.
pub const NOTE_MAX_CHARS: usize = 200;
/// Minimum characters in an admin username.
pub const USERNAME_MIN_CHARS: usize = 3;
/// Maximum characters in an admin username.
pub const USERNAME_MAX_CHARS: usize = 30;
/// Minimum characters in an admin password.
pub const PASSWORD_MIN_CHARS: usize = 8;
/// Maximum characters in an admin password.
pub const PASSWORD_MAX_CHARS: usize = 100;
/// Smallest storable length value.
pub const VALUE_MIN: i32 = -9_999;
/// Largest storable length value.
pub const VALUE_MAX: i32 = 9_999;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Caller-facing validation failure.
///
/// # Invariants
/// - Display output never includes the rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Measured name was empty after trimming.
    #[error("please enter a valid name")]
    EmptyName,
    /// Measured name exceeded [`NAME_MAX_CHARS`].
    #[error("name is too long")]
    NameTooLong,
    /// Required field was absent or blank.
    #[error("{field} is required")]
    Missing {
        /// Field name as it appears in the request.
        field: &'static str,
    },
    /// Field was shorter than allowed.
    #[error("{field} must be at least {min} characters")]
    TooShort {
        /// Field name as it appears in the request.
        field: &'static str,
        /// Minimum length.
        min: usize,
    },
    /// Field was longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Field name as it appears in the request.
        field: &'static str,
        /// Maximum length.
        max: usize,
    },
    /// Field contained characters outside its allowed set.
    #[error("{field} may only contain letters, digits, '_' and '-'")]
    Charset {
        /// Field name as it appears in the request.
        field: &'static str,
    },
    /// Numeric field was not an integer in range.
    #[error("{field} must be an integer between {min} and {max}")]
    OutOfRange {
        /// Field name as it appears in the request.
        field: &'static str,
        /// Inclusive lower bound.
        min: i32,
        /// Inclusive upper bound.
        max: i32,
    },
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Trims and checks a name submitted for measurement.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyName`] or [`ValidationError::NameTooLong`].
pub fn measurement_name(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if trimmed.chars().count() > NAME_MAX_CHARS {
        return Err(ValidationError::NameTooLong);
    }
    Ok(trimmed)
}

/// Trims and checks a required text field.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] when blank and
/// [`ValidationError::TooLong`] when longer than `max` characters.
pub fn required_text<'a>(
    raw: &'a str,
    field: &'static str,
    max: usize,
) -> Result<&'a str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Missing {
            field,
        });
    }
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
        });
    }
    Ok(trimmed)
}

/// Trims an optional free-text field, treating blank input as absent.
///
/// # Errors
///
/// Returns [`ValidationError::TooLong`] when longer than `max` characters.
pub fn optional_text(
    raw: Option<&str>,
    field: &'static str,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(ValidationError::TooLong {
            field,
            max,
        });
    }
    Ok(Some(trimmed.to_string()))
}

/// Checks that a length value fits the storable range.
///
/// # Errors
///
/// Returns [`ValidationError::OutOfRange`] outside `[VALUE_MIN, VALUE_MAX]`.
pub fn length_value(raw: i64, field: &'static str) -> Result<i32, ValidationError> {
    i32::try_from(raw)
        .ok()
        .filter(|value| (VALUE_MIN ..= VALUE_MAX).contains(value))
        .ok_or(ValidationError::OutOfRange {
            field,
            min: VALUE_MIN,
            max: VALUE_MAX,
        })
}

/// Trims and checks a username for a new admin account.
///
/// # Errors
///
/// Returns [`ValidationError`] when the length or charset is wrong.
pub fn admin_username(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    let chars = trimmed.chars().count();
    if chars < USERNAME_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field: "username",
            min: USERNAME_MIN_CHARS,
        });
    }
    if chars > USERNAME_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "username",
            max: USERNAME_MAX_CHARS,
        });
    }
    if !trimmed.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
        return Err(ValidationError::Charset {
            field: "username",
        });
    }
    Ok(trimmed)
}

/// Checks a password for a new admin account. Passwords are not trimmed.
///
/// # Errors
///
/// Returns [`ValidationError`] when the length is out of bounds.
pub fn admin_password(raw: &str) -> Result<&str, ValidationError> {
    let chars = raw.chars().count();
    if chars < PASSWORD_MIN_CHARS {
        return Err(ValidationError::TooShort {
            field: "password",
            min: PASSWORD_MIN_CHARS,
        });
    }
    if chars > PASSWORD_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "password",
            max: PASSWORD_MAX_CHARS,
        });
    }
    Ok(raw)
}

/// Checks login credentials for shape only; the store decides validity.
///
/// # Errors
///
/// Returns [`ValidationError`] when either field is blank or oversized.
pub fn login_credentials<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), ValidationError> {
    let username = required_text(username, "username", USERNAME_MAX_CHARS)?;
    if password.is_empty() {
        return Err(ValidationError::Missing {
            field: "password",
        });
    }
    if password.chars().count() > PASSWORD_MAX_CHARS {
        return Err(ValidationError::TooLong {
            field: "password",
            max: PASSWORD_MAX_CHARS,
        });
    }
    Ok((username, password))
}
