//! Withdrawals

pub mod errors;
pub mod records;
mod repository;
pub mod service;
pub mod state;

pub use errors::WithdrawalsServiceError;
pub use service::*;
