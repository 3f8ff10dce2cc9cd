//! Get Product Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    extensions::*,
    products::{errors::into_status_error, models::ProductResponse},
    state::State,
};

/// Get Product Handler
#[endpoint(
    tags("admin"),
    summary = "Get Product",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Product found"),
        (status_code = StatusCode::NOT_FOUND, description = "Product not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    code: PathParam<String>,
    depot: &mut Depot,
) -> Result<Json<ProductResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let product = state
        .app
        .products
        .get_product(&code.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use qrewards_app::domain::products::{ProductsServiceError, state::QrState};

    use crate::test_helpers::{Mocks, TEST_USER_UUID, admin_service, make_product};

    use super::*;

    fn route() -> Router {
        Router::with_path("admin/products/{code}").get(handler)
    }

    #[tokio::test]
    async fn test_get_scanned_product_reports_redeemer() -> TestResult {
        let at: Timestamp = "2026-02-21T12:00:00Z".parse()?;

        let mut mocks = Mocks::new();

        mocks
            .products
            .expect_get_product()
            .once()
            .withf(|code| code == "PRD-AAAA1111")
            .return_once(move |code| {
                let mut product = make_product(code);

                product.qr = QrState::Scanned {
                    by: TEST_USER_UUID,
                    at,
                };
                product.redeemed_by_name = Some("Asha Rao".to_string());

                Ok(product)
            });

        let mut res = TestClient::get("http://example.com/admin/products/PRD-AAAA1111")
            .send(&admin_service(mocks, route()))
            .await;

        let body: ProductResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.qr.status, "scanned");
        assert_eq!(body.qr.scanned_by, Some(TEST_USER_UUID.into_uuid()));
        assert_eq!(body.qr.scanned_at, Some(at.to_string()));
        assert_eq!(body.qr.redeemed_by_name.as_deref(), Some("Asha Rao"));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_product_returns_404() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .products
            .expect_get_product()
            .once()
            .return_once(|_| Err(ProductsServiceError::NotFound));

        let res = TestClient::get("http://example.com/admin/products/PRD-NOPE0000")
            .send(&admin_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
