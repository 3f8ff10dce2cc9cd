//! QR payload errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QrPayloadError {
    #[error("QR payload could not be decoded")]
    MalformedPayload,

    #[error("QR payload is not a product QR code")]
    InvalidPayloadType,

    #[error("QR payload could not be encoded")]
    Encoding,
}
