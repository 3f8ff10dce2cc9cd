//! Get Current User Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::UserResponse},
};

/// Get Current User Handler
///
/// Returns the signed-in user's account, profile, documents and KYC state.
#[endpoint(
    tags("me"),
    summary = "Get Current User",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let user = state
        .app
        .users
        .get_user(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use qrewards_app::domain::users::UsersServiceError;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, admin_service, make_user, user_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("me").get(handler)
    }

    #[tokio::test]
    async fn test_get_me_returns_the_signed_in_user() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .users
            .expect_get_user()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|user| Ok(make_user(user)));

        let mut res = TestClient::get("http://example.com/me")
            .send(&user_service(mocks, route()))
            .await;

        let body: UserResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, TEST_USER_UUID.into_uuid());
        assert_eq!(body.kyc.status, "incomplete");
        assert_eq!(body.documents.pan.status, "incomplete");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_me_as_admin_returns_403() -> TestResult {
        let res = TestClient::get("http://example.com/me")
            .send(&admin_service(Mocks::new(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_deleted_user_returns_404() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .users
            .expect_get_user()
            .once()
            .return_once(|_| Err(UsersServiceError::NotFound));

        let res = TestClient::get("http://example.com/me")
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
