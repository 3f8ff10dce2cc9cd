//! User Errors

use salvo::http::StatusError;
use tracing::error;

use qrewards_app::domain::users::UsersServiceError;

use crate::media;

pub(crate) fn into_status_error(error: UsersServiceError) -> StatusError {
    match error {
        UsersServiceError::NotFound => StatusError::not_found().brief("User not found"),
        UsersServiceError::EmailTaken => {
            StatusError::conflict().brief("Email address is already registered")
        }
        UsersServiceError::PhoneTaken => {
            StatusError::conflict().brief("Phone number is already registered")
        }
        UsersServiceError::ProfileLocked => StatusError::conflict()
            .brief("Profile cannot be edited while KYC is pending or approved"),
        UsersServiceError::InvalidData => StatusError::bad_request().brief("Invalid user data"),
        UsersServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        UsersServiceError::Media(source) => media::into_status_error(source),
        UsersServiceError::UserCodeExhausted => {
            error!("could not allocate a unique user code");

            StatusError::internal_server_error()
        }
        UsersServiceError::Password(source) => {
            error!("failed to hash password: {source}");

            StatusError::internal_server_error()
        }
        UsersServiceError::Time(source) => {
            error!("failed to compute deletion time: {source}");

            StatusError::internal_server_error()
        }
        UsersServiceError::Sql(source) => {
            error!("user storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
