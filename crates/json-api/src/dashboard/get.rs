//! Dashboard Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use qrewards_app::domain::dashboard::records::{DashboardSummary, ProductCounts};

use crate::{extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProductCountsResponse {
    pub active: u64,
    pub scanned: u64,
    pub disabled: u64,
}

impl From<ProductCounts> for ProductCountsResponse {
    fn from(counts: ProductCounts) -> Self {
        Self {
            active: counts.active,
            scanned: counts.scanned,
            disabled: counts.disabled,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DashboardResponse {
    pub users: u64,

    /// Products per QR status
    pub products: ProductCountsResponse,

    pub pending_kyc: u64,
    pub pending_withdrawals: u64,

    /// Unspent coins across every account
    pub coins_outstanding: u64,
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            users: summary.users,
            products: summary.products.into(),
            pending_kyc: summary.pending_kyc,
            pending_withdrawals: summary.pending_withdrawals,
            coins_outstanding: summary.coins_outstanding,
        }
    }
}

/// Dashboard Handler
#[endpoint(
    tags("admin"),
    summary = "Dashboard",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<DashboardResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let summary = state
        .app
        .dashboard
        .summary()
        .await
        .or_500("failed to compute dashboard summary")?;

    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, admin_service};

    use super::*;

    #[tokio::test]
    async fn test_dashboard_reports_counts() -> TestResult {
        let mut mocks = Mocks::new();

        mocks.dashboard.expect_summary().once().return_once(|| {
            Ok(DashboardSummary {
                users: 3,
                products: ProductCounts {
                    active: 4,
                    scanned: 2,
                    disabled: 1,
                },
                pending_kyc: 1,
                pending_withdrawals: 2,
                coins_outstanding: 1500,
            })
        });

        let mut res = TestClient::get("http://example.com/admin/dashboard")
            .send(&admin_service(
                mocks,
                Router::with_path("admin/dashboard").get(handler),
            ))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body,
            json!({
                "users": 3,
                "products": { "active": 4, "scanned": 2, "disabled": 1 },
                "pendingKyc": 1,
                "pendingWithdrawals": 2,
                "coinsOutstanding": 1500,
            })
        );

        Ok(())
    }
}
