//! Product Records

use jiff::Timestamp;

use crate::{
    domain::{categories::records::CategoryUuid, products::state::QrState},
    uuids::TypedUuid,
};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,

    /// Public product id printed in the QR payload. Never changes.
    pub product_code: String,
    pub name: String,
    pub category_uuid: Option<CategoryUuid>,
    pub category_name: Option<String>,
    pub coin_reward: u64,
    pub image_url: Option<String>,
    pub qr_image_url: String,
    pub qr_payload: String,
    pub qr: QrState,

    /// Name of the redeeming user, while that account still exists.
    pub redeemed_by_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
