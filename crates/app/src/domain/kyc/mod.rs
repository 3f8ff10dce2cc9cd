//! KYC Review

pub mod data;
pub mod errors;
pub mod service;
pub mod state;

pub use errors::KycServiceError;
pub use service::*;
