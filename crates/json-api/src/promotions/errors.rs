//! Promotion Errors

use salvo::http::StatusError;
use tracing::error;

use qrewards_app::domain::promotions::PromotionsServiceError;

use crate::media;

pub(crate) fn into_status_error(error: PromotionsServiceError) -> StatusError {
    match error {
        PromotionsServiceError::NotFound => StatusError::not_found().brief("Promotion not found"),
        PromotionsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid promotion data")
        }
        PromotionsServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        PromotionsServiceError::Media(source) => media::into_status_error(source),
        PromotionsServiceError::Sql(source) => {
            error!("promotion storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
