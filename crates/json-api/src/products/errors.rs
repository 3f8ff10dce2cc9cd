//! Product Errors

use salvo::http::StatusError;
use tracing::error;

use qrewards_app::domain::{products::ProductsServiceError, qr::QrPayloadError};

use crate::media;

pub(crate) fn into_status_error(error: ProductsServiceError) -> StatusError {
    match error {
        ProductsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Product code is already in use")
        }
        ProductsServiceError::NotFound => StatusError::not_found().brief("Product not found"),
        ProductsServiceError::UserNotFound => StatusError::not_found().brief("User not found"),
        ProductsServiceError::InvalidReference => {
            StatusError::bad_request().brief("Category does not exist")
        }
        ProductsServiceError::MissingRequiredData => {
            StatusError::bad_request().brief("Missing required product data")
        }
        ProductsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid product data")
        }
        ProductsServiceError::DuplicateRedemption => {
            StatusError::conflict().brief("You have already redeemed this product")
        }
        ProductsServiceError::ProductInactive => {
            StatusError::conflict().brief("This product's QR code is not active")
        }
        ProductsServiceError::AlreadyRedeemed { .. } => {
            StatusError::conflict().brief("QR code has already been redeemed")
        }
        ProductsServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        ProductsServiceError::Payload(QrPayloadError::Encoding) => {
            error!("failed to encode QR payload");

            StatusError::internal_server_error()
        }
        ProductsServiceError::Payload(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        ProductsServiceError::Media(source) => media::into_status_error(source),
        ProductsServiceError::Sql(source) => {
            error!("product storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}
