//! Request Withdrawal Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    extensions::*,
    state::State,
    withdrawals::{errors::into_status_error, models::WithdrawalResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateWithdrawalRequest {
    /// Coins to withdraw
    pub amount: u64,
}

/// Request Withdrawal Handler
///
/// Requires an approved KYC review and a covering balance. Nothing is debited
/// until an administrator approves the request.
#[endpoint(
    tags("withdrawals"),
    summary = "Request Withdrawal",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Withdrawal requested"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid amount"),
        (status_code = StatusCode::CONFLICT, description = "KYC not approved or insufficient balance"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "withdrawals.create", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<CreateWithdrawalRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<WithdrawalResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let withdrawal = state
        .app
        .withdrawals
        .create_request(user, json.into_inner().amount)
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(withdrawal.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use qrewards_app::domain::withdrawals::WithdrawalsServiceError;

    use crate::{
        test_helpers::{Mocks, TEST_USER_UUID, user_service},
        withdrawals::models::tests::make_withdrawal,
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("withdrawals").post(handler)
    }

    #[tokio::test]
    async fn test_request_withdrawal_returns_201() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .withdrawals
            .expect_create_request()
            .once()
            .withf(|user, amount| *user == TEST_USER_UUID && *amount == 200)
            .return_once(|user, amount| Ok(make_withdrawal(user, amount)));

        let mut res = TestClient::post("http://example.com/withdrawals")
            .json(&json!({ "amount": 200 }))
            .send(&user_service(mocks, route()))
            .await;

        let body: WithdrawalResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.status, "pending");
        assert!(body.processed_at.is_none(), "pending requests are unprocessed");

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_balance_returns_409() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .withdrawals
            .expect_create_request()
            .once()
            .return_once(|_, _| Err(WithdrawalsServiceError::InsufficientBalance));

        let res = TestClient::post("http://example.com/withdrawals")
            .json(&json!({ "amount": 600 }))
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_amount_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .withdrawals
            .expect_create_request()
            .once()
            .return_once(|_, _| Err(WithdrawalsServiceError::InvalidAmount));

        let res = TestClient::post("http://example.com/withdrawals")
            .json(&json!({ "amount": 0 }))
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_negative_amount_is_rejected_before_the_service() -> TestResult {
        let res = TestClient::post("http://example.com/withdrawals")
            .json(&json!({ "amount": -5 }))
            .send(&user_service(Mocks::new(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
