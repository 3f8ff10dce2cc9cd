//! Products service errors.

use jiff::Timestamp;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    domain::{
        products::state::QrTransitionError,
        qr::QrPayloadError,
        users::{records::UserUuid, validation::ValidationError},
    },
    media::MediaError,
};

const REDEMPTION_CONSTRAINT: &str = "reward_history_user_product_key";

#[derive(Debug, Error)]
pub enum ProductsServiceError {
    #[error("product already exists")]
    AlreadyExists,

    #[error("product not found")]
    NotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("you have already redeemed this product")]
    DuplicateRedemption,

    #[error("this product's QR code is not active")]
    ProductInactive,

    #[error("QR code has already been redeemed")]
    AlreadyRedeemed { by: UserUuid, at: Timestamp },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payload(#[from] QrPayloadError),

    #[error("media upload failed")]
    Media(#[from] MediaError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<QrTransitionError> for ProductsServiceError {
    fn from(error: QrTransitionError) -> Self {
        match error {
            QrTransitionError::AlreadyRedeemed { by, at } => Self::AlreadyRedeemed { by, at },
            QrTransitionError::Inactive => Self::ProductInactive,
        }
    }
}

impl From<Error> for ProductsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        if database_error.constraint() == Some(REDEMPTION_CONSTRAINT) {
            return Self::DuplicateRedemption;
        }

        match DatabaseError::kind(database_error) {
            ErrorKind::UniqueViolation => Self::AlreadyExists,
            ErrorKind::ForeignKeyViolation => Self::InvalidReference,
            ErrorKind::NotNullViolation => Self::MissingRequiredData,
            ErrorKind::CheckViolation => Self::InvalidData,
            ErrorKind::Other | _ => Self::Sql(error),
        }
    }
}
