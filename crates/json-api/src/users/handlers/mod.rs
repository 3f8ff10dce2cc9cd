//! User Handlers

pub(crate) mod deletion;
pub(crate) mod documents;
pub(crate) mod get;
pub(crate) mod profile;
pub(crate) mod rewards;
