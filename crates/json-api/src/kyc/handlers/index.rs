//! KYC Review Index Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::QueryParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use qrewards_app::domain::kyc::state::KycStatus;

use crate::{
    extensions::*, kyc::errors::into_status_error, state::State, users::models::UserResponse,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct KycUsersResponse {
    /// Users in the requested review state, oldest request first
    pub users: Vec<UserResponse>,
}

/// KYC Review Index Handler
///
/// Lists users by KYC status; `pending` when no status is given.
#[endpoint(
    tags("admin"),
    summary = "List KYC Reviews",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<KycUsersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = status
        .into_inner()
        .map(|status| status.parse::<KycStatus>())
        .transpose()
        .or_400("could not parse \"status\" query parameter")?
        .unwrap_or(KycStatus::Pending);

    let users = state
        .app
        .kyc
        .list_users(status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(KycUsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, admin_service, make_user};

    use super::*;

    fn route() -> Router {
        Router::with_path("admin/kyc").get(handler)
    }

    #[tokio::test]
    async fn test_index_defaults_to_pending() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .kyc
            .expect_list_users()
            .once()
            .withf(|status| *status == KycStatus::Pending)
            .return_once(|_| Ok(vec![make_user(TEST_USER_UUID)]));

        let mut res = TestClient::get("http://example.com/admin/kyc")
            .send(&admin_service(mocks, route()))
            .await;

        let body: KycUsersResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.users.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_index_filters_by_status() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .kyc
            .expect_list_users()
            .once()
            .withf(|status| *status == KycStatus::Rejected)
            .return_once(|_| Ok(vec![]));

        let res = TestClient::get("http://example.com/admin/kyc?status=rejected")
            .send(&admin_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_index_unknown_status_returns_400() -> TestResult {
        let res = TestClient::get("http://example.com/admin/kyc?status=maybe")
            .send(&admin_service(Mocks::new(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
