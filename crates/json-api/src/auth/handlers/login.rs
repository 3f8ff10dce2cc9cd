//! Login Handler

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
    users,
};

/// Login Request
///
/// Either `email` or `phone` identifies the account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LoginRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
}

/// Login Handler
///
/// Logging in cancels a pending account deletion.
#[endpoint(
    tags("auth"),
    summary = "Log In",
    responses(
        (status_code = StatusCode::OK, description = "Signed in"),
        (status_code = StatusCode::BAD_REQUEST, description = "Neither email nor phone given"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Invalid credentials"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "auth.login", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<LoginRequest>,
    depot: &mut Depot,
) -> Result<Json<SessionResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let request = json.into_inner();

    let identifier = request
        .email
        .as_deref()
        .or(request.phone.as_deref())
        .map(str::trim)
        .filter(|identifier| !identifier.is_empty())
        .ok_or_else(|| StatusError::bad_request().brief("Email or phone is required"))?;

    let session = state
        .app
        .auth
        .login(identifier, &request.password)
        .await
        .map_err(into_status_error)?;

    let user = match session.principal.user() {
        Some(user) => Some(
            state
                .app
                .users
                .get_user(user)
                .await
                .map_err(users::errors::into_status_error)?
                .into(),
        ),
        None => None,
    };

    Ok(Json(SessionResponse::new(session, user)))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use qrewards_app::auth::{AuthServiceError, IssuedSession, Principal};

    use crate::test_helpers::{Mocks, TEST_USER_UUID, make_user, public_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("auth/login").post(handler)
    }

    fn issued(principal: Principal) -> IssuedSession {
        IssuedSession {
            token: "qrw_v1_token".to_string(),
            principal,
            expires_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_login_by_phone_returns_session_and_user() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .auth
            .expect_login()
            .once()
            .withf(|identifier, password| identifier == "9876543210" && password == "secret")
            .return_once(|_, _| Ok(issued(Principal::User(TEST_USER_UUID))));

        mocks
            .users
            .expect_get_user()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|user| Ok(make_user(user)));

        let mut res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "phone": " 9876543210 ", "password": "secret" }))
            .send(&public_service(mocks, route()))
            .await;

        let session: SessionResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(session.role, "user");
        assert!(session.user.is_some(), "expected the user in the response");

        Ok(())
    }

    #[tokio::test]
    async fn test_login_without_identifier_returns_400() -> TestResult {
        let res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "password": "secret" }))
            .send(&public_service(Mocks::new(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_returns_401() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .auth
            .expect_login()
            .once()
            .return_once(|_, _| Err(AuthServiceError::InvalidCredentials));

        let res = TestClient::post("http://example.com/auth/login")
            .json(&json!({ "email": "asha@example.com", "password": "wrong" }))
            .send(&public_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
