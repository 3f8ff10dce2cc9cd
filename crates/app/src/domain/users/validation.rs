//! Field validation for signup and profile data.

use jiff::civil::Date;
use thiserror::Error;

/// A field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationError {
    #[must_use]
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_CHARS: usize = 8;

fn check(field: &'static str, ok: bool, message: &'static str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(field, message))
    }
}

fn all_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// # Errors
///
/// Returns an error unless the value has text around a single `@`.
pub fn email(value: &str) -> Result<(), ValidationError> {
    let ok = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };

    check("email", ok && !value.contains(char::is_whitespace), "must be an email address")
}

/// # Errors
///
/// Returns an error unless the value is 10 digits.
pub fn phone(value: &str) -> Result<(), ValidationError> {
    check("phone", all_digits(value, 10), "must be 10 digits")
}

/// # Errors
///
/// Returns an error if the password is too short.
pub fn password(value: &str) -> Result<(), ValidationError> {
    check(
        "password",
        value.chars().count() >= MIN_PASSWORD_CHARS,
        "must be at least 8 characters",
    )
}

/// # Errors
///
/// Returns an error for a blank value.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check(field, !value.trim().is_empty(), "must not be blank")
}

/// # Errors
///
/// Returns an error unless the value is 6 digits.
pub fn pin_code(value: &str) -> Result<(), ValidationError> {
    check("pinCode", all_digits(value, 6), "must be 6 digits")
}

/// # Errors
///
/// Returns an error unless the value is 4 letters, a `0`, then 6 letters or digits.
pub fn ifsc_code(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();

    let ok = bytes.len() == 11
        && bytes.iter().take(4).all(u8::is_ascii_alphabetic)
        && bytes.get(4) == Some(&b'0')
        && bytes.iter().skip(5).all(u8::is_ascii_alphanumeric);

    check("ifscCode", ok, "must look like ABCD0123456")
}

/// # Errors
///
/// Returns an error unless the value is 5 letters, 4 digits, then a letter.
pub fn pan_number(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();

    let ok = bytes.len() == 10
        && bytes.iter().take(5).all(u8::is_ascii_alphabetic)
        && bytes.iter().skip(5).take(4).all(u8::is_ascii_digit)
        && bytes.get(9).is_some_and(u8::is_ascii_alphabetic);

    check("panNumber", ok, "must look like ABCDE1234F")
}

/// # Errors
///
/// Returns an error unless the value is 12 digits.
pub fn aadhar_number(value: &str) -> Result<(), ValidationError> {
    check("aadharNumber", all_digits(value, 12), "must be 12 digits")
}

/// # Errors
///
/// Returns an error unless the value is an ISO `YYYY-MM-DD` date.
pub fn date_of_birth(value: &str) -> Result<(), ValidationError> {
    let ok = value.len() == 10 && value.parse::<Date>().is_ok();

    check("dateOfBirth", ok, "must be a YYYY-MM-DD date")
}
