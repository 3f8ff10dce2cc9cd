//! Create Promotion Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use qrewards_app::domain::promotions::records::NewPromotion;

use crate::{
    extensions::*,
    media::MediaBody,
    promotions::{errors::into_status_error, index::PromotionResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreatePromotionRequest {
    pub title: String,

    /// Banner image
    pub image: MediaBody,
}

/// Create Promotion Handler
#[endpoint(
    tags("admin"),
    summary = "Create Promotion",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Promotion created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "promotions.create", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<CreatePromotionRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PromotionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let promotion = NewPromotion {
        title: request.title,
        image: request.image.into_upload()?,
    };

    let promotion = state
        .app
        .promotions
        .create_promotion(promotion)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(promotion.into()))
}
