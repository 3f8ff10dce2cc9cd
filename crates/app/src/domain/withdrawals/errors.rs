//! Withdrawals service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::withdrawals::state::WithdrawalTransitionError;

#[derive(Debug, Error)]
pub enum WithdrawalsServiceError {
    #[error("withdrawal request not found")]
    NotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("KYC must be approved before withdrawing")]
    KycNotApproved,

    #[error("insufficient coin balance")]
    InsufficientBalance,

    #[error("withdrawal request has already been processed")]
    AlreadyProcessed,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<WithdrawalTransitionError> for WithdrawalsServiceError {
    fn from(error: WithdrawalTransitionError) -> Self {
        match error {
            WithdrawalTransitionError::InvalidAmount => Self::InvalidAmount,
            WithdrawalTransitionError::KycNotApproved => Self::KycNotApproved,
            WithdrawalTransitionError::InsufficientBalance => Self::InsufficientBalance,
            WithdrawalTransitionError::AlreadyProcessed => Self::AlreadyProcessed,
        }
    }
}

impl From<Error> for WithdrawalsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        let Some(database_error) = error.as_database_error() else {
            return Self::Sql(error);
        };

        match DatabaseError::kind(database_error) {
            ErrorKind::UniqueViolation => Self::AlreadyProcessed,
            ErrorKind::ForeignKeyViolation => Self::UserNotFound,
            ErrorKind::CheckViolation => Self::InvalidData,
            ErrorKind::NotNullViolation | ErrorKind::Other | _ => Self::Sql(error),
        }
    }
}
