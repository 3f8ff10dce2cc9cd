//! KYC Decision Handler

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

use qrewards_app::domain::kyc::data::KycDecision;

use crate::{
    extensions::*, kyc::errors::into_status_error, state::State, users::models::UserResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum KycAction {
    Approve,
    Reject,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct KycDecisionRequest {
    pub action: KycAction,

    /// Required when rejecting
    pub rejection_reason: Option<String>,
}

impl From<KycDecisionRequest> for KycDecision {
    fn from(request: KycDecisionRequest) -> Self {
        match request.action {
            KycAction::Approve => KycDecision::Approve,
            KycAction::Reject => KycDecision::Reject {
                reason: request.rejection_reason.unwrap_or_default(),
            },
        }
    }
}

/// KYC Decision Handler
///
/// Approval verifies every document. Rejection sends the user back to
/// resubmit their profile and documents.
#[endpoint(
    tags("admin"),
    summary = "Decide KYC Review",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Review decided"),
        (status_code = StatusCode::BAD_REQUEST, description = "Rejection without a reason"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::CONFLICT, description = "Review is not pending"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "kyc.decide", skip_all)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    json: JsonBody<KycDecisionRequest>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let user = state
        .app
        .kyc
        .decide(user.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}
