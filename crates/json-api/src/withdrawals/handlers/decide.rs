//! Withdrawal Decision Handler

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

use qrewards_app::domain::withdrawals::state::WithdrawalDecision;

use crate::{
    extensions::*,
    state::State,
    withdrawals::{errors::into_status_error, models::WithdrawalResponse},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WithdrawalVerdict {
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WithdrawalDecisionRequest {
    pub status: WithdrawalVerdict,
}

impl From<WithdrawalVerdict> for WithdrawalDecision {
    fn from(verdict: WithdrawalVerdict) -> Self {
        match verdict {
            WithdrawalVerdict::Approved => WithdrawalDecision::Approve,
            WithdrawalVerdict::Rejected => WithdrawalDecision::Reject,
        }
    }
}

/// Withdrawal Decision Handler
///
/// Approval debits the user's balance and records the payout. A request can
/// only be decided once.
#[endpoint(
    tags("admin"),
    summary = "Decide Withdrawal",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Withdrawal decided"),
        (status_code = StatusCode::NOT_FOUND, description = "Withdrawal request not found"),
        (status_code = StatusCode::CONFLICT, description = "Already processed or insufficient balance"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "withdrawals.decide", skip_all)]
pub(crate) async fn handler(
    withdrawal: PathParam<Uuid>,
    json: JsonBody<WithdrawalDecisionRequest>,
    depot: &mut Depot,
) -> Result<Json<WithdrawalResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let withdrawal = state
        .app
        .withdrawals
        .decide(withdrawal.into_inner().into(), json.into_inner().status.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(withdrawal.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use qrewards_app::domain::withdrawals::{WithdrawalsServiceError, state::WithdrawalState};

    use crate::{
        test_helpers::{Mocks, TEST_USER_UUID, admin_service},
        withdrawals::models::tests::make_withdrawal,
    };

    use super::*;

    fn route() -> Router {
        Router::with_path("admin/withdrawals/{withdrawal}").put(handler)
    }

    #[tokio::test]
    async fn test_approve_withdrawal() -> TestResult {
        let uuid = Uuid::now_v7();

        let mut mocks = Mocks::new();

        mocks
            .withdrawals
            .expect_decide()
            .once()
            .withf(move |withdrawal, decision| {
                withdrawal.into_uuid() == uuid && *decision == WithdrawalDecision::Approve
            })
            .return_once(|withdrawal, _| {
                let mut record = make_withdrawal(TEST_USER_UUID, 200);
                record.uuid = withdrawal;
                record.state = WithdrawalState::Approved {
                    processed_at: Timestamp::UNIX_EPOCH,
                };
                Ok(record)
            });

        let mut res = TestClient::put(format!("http://example.com/admin/withdrawals/{uuid}"))
            .json(&json!({ "status": "approved" }))
            .send(&admin_service(mocks, route()))
            .await;

        let body: WithdrawalResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, uuid);
        assert_eq!(body.status, "approved");
        assert_eq!(body.processed_at, Some(Timestamp::UNIX_EPOCH.to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn test_deciding_twice_returns_409() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .withdrawals
            .expect_decide()
            .once()
            .withf(|_, decision| *decision == WithdrawalDecision::Reject)
            .return_once(|_, _| Err(WithdrawalsServiceError::AlreadyProcessed));

        let url = format!("http://example.com/admin/withdrawals/{}", Uuid::now_v7());

        let res = TestClient::put(url)
            .json(&json!({ "status": "rejected" }))
            .send(&admin_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_pending_is_not_a_decision() -> TestResult {
        let url = format!("http://example.com/admin/withdrawals/{}", Uuid::now_v7());

        let res = TestClient::put(url)
            .json(&json!({ "status": "pending" }))
            .send(&admin_service(Mocks::new(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
