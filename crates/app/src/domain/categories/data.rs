//! Categories Data

use crate::media::MediaUpload;

/// New Category Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub image: Option<MediaUpload>,
}

/// Category Update Data. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub image: Option<MediaUpload>,
}
