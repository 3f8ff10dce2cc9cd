//! Update Product Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use qrewards_app::domain::products::data::ProductUpdate;

use crate::{
    extensions::*,
    media::{MediaBody, optional_upload},
    products::{errors::into_status_error, models::ProductResponse},
    state::State,
};

/// Update Product Request
///
/// Omitted fields keep their current value. The product code and QR state
/// cannot be changed here.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProductRequest {
    pub name: Option<String>,
    pub category_uuid: Option<Uuid>,

    /// Remove the product from its category
    #[serde(default)]
    pub clear_category: bool,

    pub coin_reward: Option<u64>,
    pub image: Option<MediaBody>,
}

impl UpdateProductRequest {
    fn into_update(self) -> Result<ProductUpdate, StatusError> {
        let category = if self.clear_category {
            if self.category_uuid.is_some() {
                return Err(StatusError::bad_request()
                    .brief("categoryUuid and clearCategory cannot be combined"));
            }

            Some(None)
        } else {
            self.category_uuid.map(|uuid| Some(uuid.into()))
        };

        Ok(ProductUpdate {
            name: self.name,
            category,
            coin_reward: self.coin_reward,
            image: optional_upload(self.image)?,
        })
    }
}

/// Update Product Handler
#[endpoint(
    tags("admin"),
    summary = "Update Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "products.update", skip_all)]
pub(crate) async fn handler(
    code: PathParam<String>,
    json: JsonBody<UpdateProductRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let update = json.into_inner().into_update()?;

    let product = state
        .app
        .products
        .update_product(&code.into_inner(), update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}
