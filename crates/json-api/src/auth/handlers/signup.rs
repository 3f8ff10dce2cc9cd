//! Signup Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use qrewards_app::{auth::Principal, domain::users::data::NewUser};

use crate::{
    auth::{into_status_error, models::SessionResponse},
    extensions::*,
    state::State,
    users,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SignupRequest {
    pub name: String,
    pub email: String,

    /// Ten digit mobile number
    pub phone: String,

    pub password: String,
}

impl From<SignupRequest> for NewUser {
    fn from(request: SignupRequest) -> Self {
        NewUser {
            name: request.name,
            email: request.email,
            phone: request.phone,
            password: request.password,
        }
    }
}

/// Signup Handler
///
/// Creates an account and signs it in.
#[endpoint(
    tags("auth"),
    summary = "Sign Up",
    responses(
        (status_code = StatusCode::CREATED, description = "Account created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid signup details"),
        (status_code = StatusCode::CONFLICT, description = "Email or phone already registered"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "auth.signup", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<SignupRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let user = state
        .app
        .users
        .signup(json.into_inner().into())
        .await
        .map_err(users::errors::into_status_error)?;

    let session = state
        .app
        .auth
        .start_session(Principal::User(user.uuid))
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(SessionResponse::new(session, Some(user.into()))))
}
