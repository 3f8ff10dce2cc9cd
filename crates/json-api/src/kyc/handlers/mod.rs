pub(crate) mod decide;
pub(crate) mod document;
pub(crate) mod index;
