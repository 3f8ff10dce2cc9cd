//! KYC Errors

use salvo::http::StatusError;
use tracing::error;

use qrewards_app::domain::kyc::KycServiceError;

pub(crate) fn into_status_error(error: KycServiceError) -> StatusError {
    match error {
        KycServiceError::NotFound => StatusError::not_found().brief("User not found"),
        KycServiceError::NotPending => StatusError::conflict().brief("KYC review is not pending"),
        KycServiceError::MissingReason => {
            StatusError::bad_request().brief("A rejection reason is required")
        }
        KycServiceError::DocumentNotSubmitted => {
            StatusError::conflict().brief("Document has not been submitted")
        }
        KycServiceError::Sql(source) => {
            error!("kyc storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
