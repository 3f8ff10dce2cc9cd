//! Account Deletion Handlers

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{extensions::*, state::State, users::errors::into_status_error};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeletionScheduledResponse {
    /// When the account will be deleted unless the request is cancelled
    pub deletion_scheduled_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DeletionCancelledResponse {
    /// Whether a pending deletion was cancelled
    pub cancelled: bool,
}

/// Request Account Deletion Handler
///
/// Schedules the account for deletion after the grace period. Logging in
/// again before then cancels the request.
#[endpoint(
    tags("me"),
    summary = "Request Account Deletion",
    security(("bearer_auth" = []))
)]
#[instrument(name = "users.request_deletion", skip_all)]
pub(crate) async fn request(
    depot: &mut Depot,
) -> Result<Json<DeletionScheduledResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let scheduled_at = state
        .app
        .users
        .request_deletion(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(DeletionScheduledResponse {
        deletion_scheduled_at: scheduled_at.to_string(),
    }))
}

/// Cancel Account Deletion Handler
#[endpoint(
    tags("me"),
    summary = "Cancel Account Deletion",
    security(("bearer_auth" = []))
)]
#[instrument(name = "users.cancel_deletion", skip_all)]
pub(crate) async fn cancel(
    depot: &mut Depot,
) -> Result<Json<DeletionCancelledResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let cancelled = state
        .app
        .users
        .cancel_deletion(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(DeletionCancelledResponse { cancelled }))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, user_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("me/deletion").post(request).delete(cancel)
    }

    #[tokio::test]
    async fn test_request_deletion_returns_schedule() -> TestResult {
        let at: Timestamp = "2026-03-01T00:00:00Z".parse()?;

        let mut mocks = Mocks::new();

        mocks
            .users
            .expect_request_deletion()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(move |_| Ok(at));

        let mut res = TestClient::post("http://example.com/me/deletion")
            .send(&user_service(mocks, route()))
            .await;

        let body: DeletionScheduledResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.deletion_scheduled_at, at.to_string());

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_deletion_reports_outcome() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .users
            .expect_cancel_deletion()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|_| Ok(true));

        let mut res = TestClient::delete("http://example.com/me/deletion")
            .send(&user_service(mocks, route()))
            .await;

        let body: DeletionCancelledResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert!(body.cancelled, "expected the deletion to be cancelled");

        Ok(())
    }
}
