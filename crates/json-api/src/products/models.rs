//! Product response bodies

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use qrewards_app::domain::products::{records::ProductRecord, state::QrState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QrResponse {
    /// `active`, `disabled` or `scanned`
    pub status: String,

    /// JSON text encoded into the QR image
    pub payload: String,

    pub image_url: String,

    /// UUID of the redeeming user
    pub scanned_by: Option<Uuid>,

    pub scanned_at: Option<String>,

    /// Name of the redeeming user, while that account still exists
    pub redeemed_by_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProductResponse {
    pub uuid: Uuid,
    pub product_id: String,
    pub name: String,
    pub category_uuid: Option<Uuid>,
    pub category_name: Option<String>,
    pub coin_reward: u64,
    pub image_url: Option<String>,
    pub qr: QrResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(product: ProductRecord) -> Self {
        let (scanned_by, scanned_at) = match product.qr {
            QrState::Scanned { by, at } => (Some(by.into_uuid()), Some(at.to_string())),
            QrState::Active | QrState::Disabled => (None, None),
        };

        Self {
            uuid: product.uuid.into_uuid(),
            product_id: product.product_code,
            name: product.name,
            category_uuid: product.category_uuid.map(|category| category.into_uuid()),
            category_name: product.category_name,
            coin_reward: product.coin_reward,
            image_url: product.image_url,
            qr: QrResponse {
                status: product.qr.status().to_string(),
                payload: product.qr_payload,
                image_url: product.qr_image_url,
                scanned_by,
                scanned_at,
                redeemed_by_name: product.redeemed_by_name,
            },
            created_at: product.created_at.to_string(),
            updated_at: product.updated_at.to_string(),
        }
    }
}
