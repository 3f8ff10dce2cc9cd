//! Promotion Index Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use qrewards_app::domain::promotions::records::PromotionRecord;

use crate::{extensions::*, promotions::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromotionResponse {
    pub uuid: Uuid,
    pub title: String,

    /// Banner image
    pub image_url: String,

    pub created_at: String,
}

impl From<PromotionRecord> for PromotionResponse {
    fn from(promotion: PromotionRecord) -> Self {
        Self {
            uuid: promotion.uuid.into_uuid(),
            title: promotion.title,
            image_url: promotion.image_url,
            created_at: promotion.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PromotionsResponse {
    /// Promotions, newest first
    pub promotions: Vec<PromotionResponse>,
}

/// Promotion Index Handler
#[endpoint(tags("promotions"), summary = "List Promotions")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<PromotionsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let promotions = state
        .app
        .promotions
        .list_promotions()
        .await
        .map_err(into_status_error)?;

    Ok(Json(PromotionsResponse {
        promotions: promotions.into_iter().map(Into::into).collect(),
    }))
}
