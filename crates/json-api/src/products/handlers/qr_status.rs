//! Toggle QR Status Handler

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

use crate::{
    extensions::*,
    products::{errors::into_status_error, models::ProductResponse},
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct QrStatusRequest {
    /// `true` activates the QR code, `false` disables it
    pub enabled: bool,
}

/// Toggle QR Status Handler
///
/// Scanned QR codes can no longer be toggled.
#[endpoint(
    tags("admin"),
    summary = "Enable or Disable QR Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "QR status changed"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::CONFLICT, description = "QR code already redeemed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[instrument(name = "products.set_qr_status", skip_all)]
pub(crate) async fn handler(
    code: PathParam<String>,
    json: JsonBody<QrStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .set_qr_enabled(&code.into_inner(), json.into_inner().enabled)
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use qrewards_app::domain::products::{ProductsServiceError, state::QrState};

    use crate::test_helpers::{Mocks, TEST_USER_UUID, admin_service, make_product};

    use super::*;

    fn route() -> Router {
        Router::with_path("admin/products/{code}/qr-status").put(handler)
    }

    #[tokio::test]
    async fn test_disable_qr_code() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .products
            .expect_set_qr_enabled()
            .once()
            .withf(|code, enabled| code == "PRD-AAAA1111" && !*enabled)
            .return_once(|code, _| {
                let mut product = make_product(code);
                product.qr = QrState::Disabled;
                Ok(product)
            });

        let mut res = TestClient::put("http://example.com/admin/products/PRD-AAAA1111/qr-status")
            .json(&json!({ "enabled": false }))
            .send(&admin_service(mocks, route()))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.qr.status, "disabled");

        Ok(())
    }

    #[tokio::test]
    async fn test_toggling_scanned_code_returns_409() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .products
            .expect_set_qr_enabled()
            .once()
            .return_once(|_, _| {
                Err(ProductsServiceError::AlreadyRedeemed {
                    by: TEST_USER_UUID,
                    at: Timestamp::UNIX_EPOCH,
                })
            });

        let res = TestClient::put("http://example.com/admin/products/PRD-AAAA1111/qr-status")
            .json(&json!({ "enabled": true }))
            .send(&admin_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
