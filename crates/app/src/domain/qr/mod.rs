//! QR Payloads

pub mod errors;
pub mod payload;

pub use errors::QrPayloadError;
pub use payload::*;
