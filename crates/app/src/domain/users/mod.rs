//! Users

pub mod completeness;
pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod validation;

pub use errors::UsersServiceError;
pub use service::*;
