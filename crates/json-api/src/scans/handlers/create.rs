//! Scan QR Code Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use qrewards_app::domain::products::{ProductsServiceError, data::RedemptionOutcome};

use crate::{
    extensions::*, observability::record_scan_outcome, products::errors::into_status_error,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ScanRequest {
    /// The decoded QR payload, either as the JSON object itself or as its text
    pub payload: Value,
}

/// Scan Response
///
/// A QR code someone else already consumed is reported, not raised.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub(crate) enum ScanResponse {
    Redeemed {
        #[serde(rename = "productId")]
        product_id: String,

        #[serde(rename = "productName")]
        product_name: String,

        /// Coins credited by this scan
        #[serde(rename = "coinsEarned")]
        coins_earned: u64,

        /// Balance after the credit
        #[serde(rename = "totalCoins")]
        total_coins: u64,

        #[serde(rename = "redeemedAt")]
        redeemed_at: String,
    },
    AlreadyUsed {
        /// Name of the redeeming user, while that account still exists
        #[serde(rename = "redeemedBy")]
        redeemed_by: Option<String>,

        #[serde(rename = "redeemedAt")]
        redeemed_at: String,
    },
}

impl From<RedemptionOutcome> for ScanResponse {
    fn from(outcome: RedemptionOutcome) -> Self {
        match outcome {
            RedemptionOutcome::Redeemed {
                entry,
                coins_earned,
            } => Self::Redeemed {
                product_id: entry.product_code,
                product_name: entry.product_name,
                coins_earned: entry.coins_earned,
                total_coins: coins_earned,
                redeemed_at: entry.redeemed_at.to_string(),
            },
            RedemptionOutcome::AlreadyUsed {
                redeemed_by,
                redeemed_at,
            } => Self::AlreadyUsed {
                redeemed_by,
                redeemed_at: redeemed_at.to_string(),
            },
        }
    }
}

/// Scan QR Code Handler
///
/// Redeems a scanned product QR code for the signed-in user.
#[endpoint(
    tags("scans"),
    summary = "Scan QR Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Redeemed, or already used by someone else"),
        (status_code = StatusCode::BAD_REQUEST, description = "Not a product QR code"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "Already redeemed by you, or QR code disabled"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "scans.create", skip_all)]
pub(crate) async fn handler(
    json: JsonBody<ScanRequest>,
    depot: &mut Depot,
) -> Result<Json<ScanResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let outcome = state
        .app
        .products
        .redeem(user, json.into_inner().payload)
        .await
        .map_err(|error| {
            record_scan_outcome(refusal_label(&error));

            into_status_error(error)
        })?;

    record_scan_outcome(match outcome {
        RedemptionOutcome::Redeemed { .. } => "redeemed",
        RedemptionOutcome::AlreadyUsed { .. } => "already_used",
    });

    Ok(Json(outcome.into()))
}

fn refusal_label(error: &ProductsServiceError) -> &'static str {
    match error {
        ProductsServiceError::Payload(_) => "invalid_payload",
        ProductsServiceError::NotFound => "unknown_product",
        ProductsServiceError::DuplicateRedemption => "duplicate",
        ProductsServiceError::ProductInactive => "inactive",
        ProductsServiceError::AlreadyRedeemed { .. } => "already_used",
        _ => "error",
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use qrewards_app::domain::{
        products::ProductsServiceError,
        qr::QrPayloadError,
        users::records::{RewardEntry, RewardEntryUuid},
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID, admin_service, user_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("scans").post(handler)
    }

    fn payload() -> Value {
        json!({
            "productId": "PRD-AAAA1111",
            "type": "PRODUCT_QR",
            "timestamp": 0,
            "hash": "0000000000000000",
        })
    }

    #[tokio::test]
    async fn test_scan_redeems_for_signed_in_user() -> TestResult {
        let at: Timestamp = "2026-02-21T12:00:00Z".parse()?;

        let mut mocks = Mocks::new();

        mocks
            .products
            .expect_redeem()
            .once()
            .withf(|user, payload| {
                *user == TEST_USER_UUID && payload["productId"] == "PRD-AAAA1111"
            })
            .return_once(move |_, _| {
                Ok(RedemptionOutcome::Redeemed {
                    entry: RewardEntry {
                        uuid: RewardEntryUuid::new(),
                        product_code: "PRD-AAAA1111".to_string(),
                        product_name: "Orange Soda".to_string(),
                        category_name: None,
                        coins_earned: 500,
                        redeemed_at: at,
                    },
                    coins_earned: 1500,
                })
            });

        let mut res = TestClient::post("http://example.com/scans")
            .json(&json!({ "payload": payload() }))
            .send(&user_service(mocks, route()))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body,
            json!({
                "outcome": "redeemed",
                "productId": "PRD-AAAA1111",
                "productName": "Orange Soda",
                "coinsEarned": 500,
                "totalCoins": 1500,
                "redeemedAt": at.to_string(),
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_scan_of_consumed_code_reports_already_used() -> TestResult {
        let mut mocks = Mocks::new();

        mocks.products.expect_redeem().once().return_once(|_, _| {
            Ok(RedemptionOutcome::AlreadyUsed {
                redeemed_by: Some("Ravi Kumar".to_string()),
                redeemed_at: Timestamp::UNIX_EPOCH,
            })
        });

        let mut res = TestClient::post("http://example.com/scans")
            .json(&json!({ "payload": payload() }))
            .send(&user_service(mocks, route()))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["outcome"], "already_used");
        assert_eq!(body["redeemedBy"], "Ravi Kumar");

        Ok(())
    }

    #[tokio::test]
    async fn test_second_scan_by_same_user_returns_409() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .products
            .expect_redeem()
            .once()
            .return_once(|_, _| Err(ProductsServiceError::DuplicateRedemption));

        let res = TestClient::post("http://example.com/scans")
            .json(&json!({ "payload": payload() }))
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_payload_returns_400() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .products
            .expect_redeem()
            .once()
            .return_once(|_, _| {
                Err(ProductsServiceError::Payload(
                    QrPayloadError::InvalidPayloadType,
                ))
            });

        let res = TestClient::post("http://example.com/scans")
            .json(&json!({ "payload": { "type": "COUPON" } }))
            .send(&user_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_cannot_scan() -> TestResult {
        let res = TestClient::post("http://example.com/scans")
            .json(&json!({ "payload": payload() }))
            .send(&admin_service(Mocks::new(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }
}
