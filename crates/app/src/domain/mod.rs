//! Rewards Domain Concerns

pub mod categories;
pub mod dashboard;
pub mod kyc;
pub mod products;
pub mod promotions;
pub mod qr;
pub mod users;
pub mod withdrawals;
