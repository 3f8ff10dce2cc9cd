//! KYC service errors.

use sqlx::Error;
use thiserror::Error;

use crate::domain::kyc::state::KycTransitionError;

#[derive(Debug, Error)]
pub enum KycServiceError {
    #[error("user not found")]
    NotFound,

    #[error("KYC review is not pending")]
    NotPending,

    #[error("a rejection reason is required")]
    MissingReason,

    #[error("document has not been submitted")]
    DocumentNotSubmitted,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<KycTransitionError> for KycServiceError {
    fn from(error: KycTransitionError) -> Self {
        match error {
            KycTransitionError::NotPending | KycTransitionError::NotSubmittable => Self::NotPending,
            KycTransitionError::MissingReason => Self::MissingReason,
            KycTransitionError::DocumentNotSubmitted => Self::DocumentNotSubmitted,
        }
    }
}

impl From<Error> for KycServiceError {
    fn from(error: Error) -> Self {
        match error {
            Error::RowNotFound => Self::NotFound,
            error => Self::Sql(error),
        }
    }
}
