//! Promotion Records

use jiff::Timestamp;

use crate::{media::MediaUpload, uuids::TypedUuid};

/// Promotion UUID
pub type PromotionUuid = TypedUuid<PromotionRecord>;

/// Promotional banner shown to every user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRecord {
    pub uuid: PromotionUuid,
    pub title: String,
    pub image_url: String,
    pub created_at: Timestamp,
}

/// New Promotion Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPromotion {
    pub title: String,
    pub image: MediaUpload,
}
