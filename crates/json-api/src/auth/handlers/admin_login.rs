//! Admin Login Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::{into_status_error, models::SessionResponse},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin Login Handler
///
/// Signs in the single configured administrator.
#[endpoint(
    tags("auth"),
    summary = "Admin Log In",
    responses(
        (status_code = StatusCode::OK, description = "Signed in"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid credentials"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "auth.admin_login", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<AdminLoginRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let session = state
        .app
        .auth
        .admin_login(&request.email, &request.password)
        .await
        .map_err(into_status_error)?;

    Ok(Json(SessionResponse::new(session, None)))
}
