pub(crate) mod admin_index;
pub(crate) mod create;
pub(crate) mod decide;
pub(crate) mod history;
pub(crate) mod index;
