//! Admin Dashboard

pub(crate) mod get;
