//! Create Product Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use qrewards_app::domain::products::data::NewProduct;

use crate::{
    extensions::*,
    media::{MediaBody, optional_upload},
    products::{errors::into_status_error, models::ProductResponse},
    state::State,
};

/// Create Product Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateProductRequest {
    /// Product code printed in the QR payload; generated when omitted
    pub product_id: Option<String>,

    pub name: String,
    pub category_uuid: Option<Uuid>,

    /// Coins credited to the user who redeems the QR code
    pub coin_reward: u64,

    pub image: Option<MediaBody>,
}

impl CreateProductRequest {
    fn into_new_product(self) -> Result<NewProduct, StatusError> {
        Ok(NewProduct {
            product_code: self.product_id,
            name: self.name,
            category: self.category_uuid.map(Into::into),
            coin_reward: self.coin_reward,
            image: optional_upload(self.image)?,
        })
    }
}

/// Create Product Handler
///
/// Creates a product and issues its QR code in the `active` state.
#[endpoint(
    tags("admin"),
    summary = "Create Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Product created"),
        (status_code = StatusCode::CONFLICT, description = "Product code already in use"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "products.create", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<CreateProductRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .create_product(json.into_inner().into_new_product()?)
        .await
        .map_err(into_status_error)?;

    res.add_header(
        LOCATION,
        format!("/admin/products/{}", product.product_code),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(product.into()))
}
