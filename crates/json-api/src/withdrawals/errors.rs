//! Withdrawal Errors

use salvo::http::StatusError;
use tracing::error;

use qrewards_app::domain::withdrawals::WithdrawalsServiceError;

pub(crate) fn into_status_error(error: WithdrawalsServiceError) -> StatusError {
    match error {
        WithdrawalsServiceError::NotFound => {
            StatusError::not_found().brief("Withdrawal request not found")
        }
        WithdrawalsServiceError::UserNotFound => StatusError::not_found().brief("User not found"),
        WithdrawalsServiceError::InvalidAmount => {
            StatusError::bad_request().brief("Amount must be greater than zero")
        }
        WithdrawalsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid withdrawal data")
        }
        WithdrawalsServiceError::KycNotApproved => {
            StatusError::conflict().brief("KYC must be approved before withdrawing")
        }
        WithdrawalsServiceError::InsufficientBalance => {
            StatusError::conflict().brief("Insufficient coin balance")
        }
        WithdrawalsServiceError::AlreadyProcessed => {
            StatusError::conflict().brief("Withdrawal request has already been processed")
        }
        WithdrawalsServiceError::Sql(source) => {
            error!("withdrawal storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
