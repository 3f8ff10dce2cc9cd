//! Category Errors

use salvo::http::StatusError;
use tracing::error;

use qrewards_app::domain::categories::CategoriesServiceError;

use crate::media;

pub(crate) fn into_status_error(error: CategoriesServiceError) -> StatusError {
    match error {
        CategoriesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Category name already exists")
        }
        CategoriesServiceError::NotFound => StatusError::not_found().brief("Category not found"),
        CategoriesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid category data")
        }
        CategoriesServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        CategoriesServiceError::Media(source) => media::into_status_error(source),
        CategoriesServiceError::Sql(source) => {
            error!("category storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
