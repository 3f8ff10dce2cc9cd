//! QR Scans

mod handlers;

pub(crate) use handlers::*;
