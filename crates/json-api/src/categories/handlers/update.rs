//! Update Category Handler

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

use qrewards_app::domain::categories::data::CategoryUpdate;

use crate::{
    categories::{errors::into_status_error, models::CategoryResponse},
    extensions::*,
    media::{MediaBody, optional_upload},
    state::State,
};

/// Update Category Request
///
/// Omitted fields keep their current value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub image: Option<MediaBody>,
}

/// Update Category Handler
#[endpoint(
    tags("admin"),
    summary = "Update Category",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Category updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Category not found"),
        (status_code = StatusCode::CONFLICT, description = "Category name already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "categories.update", skip_all)]
pub(crate) async fn handler(
    category: PathParam<Uuid>,
    json: JsonBody<UpdateCategoryRequest>,
    depot: &mut Depot,
) -> Result<Json<CategoryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let update = CategoryUpdate {
        name: request.name,
        image: optional_upload(request.image)?,
    };

    let category = state
        .app
        .categories
        .update_category(category.into_inner().into(), update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(category.into()))
}
