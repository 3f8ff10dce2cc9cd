//! Update Profile Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use qrewards_app::domain::users::data::ProfileUpdate;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::UserResponse},
};

/// Update Profile Request
///
/// Omitted fields keep their current value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateProfileRequest {
    pub name: Option<String>,

    /// `YYYY-MM-DD`
    pub date_of_birth: Option<String>,

    pub address_line: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,

    /// Six digits
    pub pin_code: Option<String>,

    pub account_holder_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub bank_name: Option<String>,
    pub pan_number: Option<String>,
    pub aadhar_number: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            name: request.name,
            date_of_birth: request.date_of_birth,
            address_line: request.address_line,
            city: request.city,
            state: request.state,
            pin_code: request.pin_code,
            account_holder_name: request.account_holder_name,
            account_number: request.account_number,
            ifsc_code: request.ifsc_code,
            bank_name: request.bank_name,
            pan_number: request.pan_number,
            aadhar_number: request.aadhar_number,
        }
    }
}

/// Update Profile Handler
///
/// Completing the profile and documents submits the account for KYC review.
#[endpoint(
    tags("me"),
    summary = "Update Profile",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Profile updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid field"),
        (status_code = StatusCode::CONFLICT, description = "Profile locked by KYC review"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "users.update_profile", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<UpdateProfileRequest>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let user = state
        .app
        .users
        .update_profile(user, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use qrewards_app::domain::users::{UsersServiceError, validation::ValidationError};

    use crate::test_helpers::{Mocks, TEST_USER_UUID, make_user, user_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("me/profile").put(handler)
    }

    #[tokio::test]
    async fn test_update_profile_forwards_given_fields() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .users
            .expect_update_profile()
            .once()
            .withf(|user, update| {
                *user == TEST_USER_UUID
                    && update.city.as_deref() == Some("Bengaluru")
                    && update.pin_code.as_deref() == Some("560001")
                    && update.name.is_none()
            })
            .return_once(|user, _| Ok(make_user(user)));

        let mut res = TestClient::put("http://example.com/me/profile")
            .json(&json!({ "city": "Bengaluru", "pinCode": "560001" }))
            .send(&user_service(mocks, route()))
            .await;

        let body: UserResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, TEST_USER_UUID.into_uuid());

        Ok(())
    }

    #[tokio::test]
    async fn test_locked_profile_returns_409() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .users
            .expect_update_profile()
            .once()
            .return_once(|_, _| Err(UsersServiceError::ProfileLocked));

        let res = TestClient::put("http://example.com/me/profile")
            .json(&json!({ "city": "Mysuru" }))
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_field_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .users
            .expect_update_profile()
            .once()
            .return_once(|_, _| {
                Err(UsersServiceError::Validation(ValidationError::new(
                    "pinCode",
                    "must be six digits",
                )))
            });

        let res = TestClient::put("http://example.com/me/profile")
            .json(&json!({ "pinCode": "12" }))
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
