//! Users service errors.

use jiff::Error as TimeError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{auth::PasswordError, domain::users::validation::ValidationError, media::MediaError};

pub(crate) const USER_CODE_CONSTRAINT: &str = "users_user_code_key";
pub(crate) const EMAIL_CONSTRAINT: &str = "users_email_key";
pub(crate) const PHONE_CONSTRAINT: &str = "users_phone_key";

#[derive(Debug, Error)]
pub enum UsersServiceError {
    #[error("user not found")]
    NotFound,

    #[error("email address is already registered")]
    EmailTaken,

    #[error("phone number is already registered")]
    PhoneTaken,

    #[error("could not allocate a unique user code")]
    UserCodeExhausted,

    #[error("profile cannot be edited while KYC is pending or approved")]
    ProfileLocked,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("media upload failed")]
    Media(#[from] MediaError),

    #[error("password hashing failed")]
    Password(#[from] PasswordError),

    #[error("timestamp out of range")]
    Time(#[from] TimeError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for UsersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        let kind = DatabaseError::kind(database_error);

        match (kind, database_error.constraint()) {
            (ErrorKind::UniqueViolation, Some(EMAIL_CONSTRAINT)) => Self::EmailTaken,
            (ErrorKind::UniqueViolation, Some(PHONE_CONSTRAINT)) => Self::PhoneTaken,
            (ErrorKind::CheckViolation | ErrorKind::NotNullViolation, _) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

/// Whether `error` is a collision on the generated user code.
pub(crate) fn is_user_code_collision(error: &Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|e| e.is_unique_violation() && e.constraint() == Some(USER_CODE_CONSTRAINT))
}
