//! Upload Document Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use tracing::instrument;

use qrewards_app::domain::users::records::DocumentType;

use crate::{
    extensions::*,
    media::MediaBody,
    state::State,
    users::{errors::into_status_error, models::UserResponse},
};

/// Upload Document Handler
///
/// Replaces the image of one KYC document (`pan`, `aadhar` or `passbook`).
#[endpoint(
    tags("me"),
    summary = "Upload Document",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Document stored"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown document or invalid image"),
        (status_code = StatusCode::CONFLICT, description = "Profile locked by KYC review"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "users.upload_document", skip_all)]
pub(crate) async fn handler(
    document: PathParam<String>,
    json: JsonBody<MediaBody>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let document = document
        .into_inner()
        .parse::<DocumentType>()
        .or_400("unknown document")?;

    let upload = json.into_inner().into_upload()?;

    let user = state
        .app
        .users
        .upload_document(user, document, upload)
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}
