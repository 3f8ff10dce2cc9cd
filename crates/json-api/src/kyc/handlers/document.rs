//! Document Decision Handler

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

use qrewards_app::domain::{kyc::state::DocumentDecision, users::records::DocumentType};

use crate::{
    extensions::*, kyc::errors::into_status_error, state::State, users::models::UserResponse,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DocumentVerdict {
    Verified,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentDecisionRequest {
    pub status: DocumentVerdict,

    /// Required when rejecting
    pub rejection_reason: Option<String>,
}

impl From<DocumentDecisionRequest> for DocumentDecision {
    fn from(request: DocumentDecisionRequest) -> Self {
        match request.status {
            DocumentVerdict::Verified => DocumentDecision::Verify,
            DocumentVerdict::Rejected => DocumentDecision::Reject {
                reason: request.rejection_reason.unwrap_or_default(),
            },
        }
    }
}

/// Document Decision Handler
///
/// Verifies or rejects one submitted document. The overall review stays
/// pending.
#[endpoint(
    tags("admin"),
    summary = "Decide Document",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Document decided"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown document or missing reason"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::CONFLICT, description = "Document not submitted"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "kyc.decide_document", skip_all)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    document: PathParam<String>,
    json: JsonBody<DocumentDecisionRequest>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let document = document
        .into_inner()
        .parse::<DocumentType>()
        .or_400("unknown document")?;

    let user = state
        .app
        .kyc
        .decide_document(user.into_inner().into(), document, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}
