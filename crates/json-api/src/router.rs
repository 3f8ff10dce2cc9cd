//! API Routes

use salvo::Router;

use crate::{
    auth::{
        self,
        middleware::{authenticate, require_admin, require_user},
    },
    categories, dashboard, kyc, products, promotions, scans, users, withdrawals,
};

/// Every API route. Public routes come first; the rest require a session.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(public_router())
        .push(
            Router::new()
                .hoop(authenticate)
                .push(Router::with_path("auth/logout").post(auth::logout::handler))
                .push(user_router())
                .push(admin_router()),
        )
}

fn public_router() -> Router {
    Router::new()
        .push(Router::with_path("auth/signup").post(auth::signup::handler))
        .push(Router::with_path("auth/login").post(auth::login::handler))
        .push(Router::with_path("admin/login").post(auth::admin_login::handler))
        .push(Router::with_path("categories").get(categories::index::handler))
        .push(Router::with_path("promotions").get(promotions::index::handler))
}

fn user_router() -> Router {
    Router::new()
        .hoop(require_user)
        .push(
            Router::with_path("me")
                .get(users::get::handler)
                .push(Router::with_path("profile").put(users::profile::handler))
                .push(Router::with_path("documents/{document}").put(users::documents::handler))
                .push(Router::with_path("rewards").get(users::rewards::handler))
                .push(
                    Router::with_path("deletion")
                        .post(users::deletion::request)
                        .delete(users::deletion::cancel),
                ),
        )
        .push(Router::with_path("scans").post(scans::create::handler))
        .push(
            Router::with_path("withdrawals")
                .get(withdrawals::index::handler)
                .post(withdrawals::create::handler)
                .push(Router::with_path("history").get(withdrawals::history::handler)),
        )
}

fn admin_router() -> Router {
    Router::with_path("admin")
        .hoop(require_admin)
        .push(Router::with_path("dashboard").get(dashboard::get::handler))
        .push(
            Router::with_path("categories")
                .get(categories::index::handler)
                .post(categories::create::handler)
                .push(
                    Router::with_path("{category}")
                        .put(categories::update::handler)
                        .delete(categories::delete::handler),
                ),
        )
        .push(
            Router::with_path("promotions")
                .get(promotions::index::handler)
                .post(promotions::create::handler)
                .push(Router::with_path("{promotion}").delete(promotions::delete::handler)),
        )
        .push(
            Router::with_path("products")
                .get(products::index::handler)
                .post(products::create::handler)
                .push(
                    Router::with_path("{code}")
                        .get(products::get::handler)
                        .put(products::update::handler)
                        .delete(products::delete::handler)
                        .push(Router::with_path("qr-status").put(products::qr_status::handler)),
                ),
        )
        .push(
            Router::with_path("kyc")
                .get(kyc::index::handler)
                .push(Router::with_path("{user}").put(kyc::decide::handler)),
        )
        .push(Router::with_path("users/{user}/documents/{document}").put(kyc::document::handler))
        .push(
            Router::with_path("withdrawals")
                .get(withdrawals::admin_index::handler)
                .push(Router::with_path("{withdrawal}").put(withdrawals::decide::handler)),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        Service,
        affix_state::inject,
        http::{StatusCode, header::AUTHORIZATION},
        test::{ResponseExt, TestClient},
    };
    use serde_json::{Value, json};
    use testresult::TestResult;

    use qrewards_app::{
        auth::{AuthServiceError, Principal},
        domain::categories::records::CategoryRecord,
    };

    use crate::test_helpers::{Mocks, TEST_USER_UUID};

    use super::*;

    fn service(mocks: Mocks) -> Service {
        Service::new(Router::new().hoop(inject(mocks.into_state())).push(app_router()))
    }

    fn bearer_as(mocks: &mut Mocks, principal: Principal) {
        mocks
            .auth
            .expect_authenticate_bearer()
            .returning(move |_| Ok(principal));
    }

    #[tokio::test]
    async fn public_routes_need_no_session() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .categories
            .expect_list_categories()
            .once()
            .return_once(|| Ok(Vec::<CategoryRecord>::new()));

        let mut res = TestClient::get("http://example.com/categories")
            .send(&service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: Value = res.take_json().await?;

        assert_eq!(body, json!({ "categories": [] }));

        Ok(())
    }

    #[tokio::test]
    async fn protected_routes_need_a_session() -> TestResult {
        let mut mocks = Mocks::new();

        mocks
            .auth
            .expect_authenticate_bearer()
            .returning(|_| Err(AuthServiceError::NotFound));

        let service = service(mocks);

        for url in ["me", "withdrawals", "admin/dashboard", "admin/kyc"] {
            let res = TestClient::get(format!("http://example.com/{url}"))
                .add_header(AUTHORIZATION, "Bearer qrw_v1_unknown", true)
                .send(&service)
                .await;

            assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED), "{url}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn users_cannot_reach_admin_routes() -> TestResult {
        let mut mocks = Mocks::new();

        bearer_as(&mut mocks, Principal::User(TEST_USER_UUID));

        let service = service(mocks);

        for url in ["admin/dashboard", "admin/products", "admin/withdrawals"] {
            let res = TestClient::get(format!("http://example.com/{url}"))
                .add_header(AUTHORIZATION, "Bearer qrw_v1_user", true)
                .send(&service)
                .await;

            assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN), "{url}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn admins_cannot_reach_user_routes() -> TestResult {
        let mut mocks = Mocks::new();

        bearer_as(&mut mocks, Principal::Admin);

        let service = service(mocks);

        for url in ["me", "me/rewards", "withdrawals/history"] {
            let res = TestClient::get(format!("http://example.com/{url}"))
                .add_header(AUTHORIZATION, "Bearer qrw_v1_admin", true)
                .send(&service)
                .await;

            assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN), "{url}");
        }

        Ok(())
    }
}
