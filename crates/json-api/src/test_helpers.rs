//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use qrewards_app::{
    auth::{MockAuthService, Principal},
    context::AppContext,
    domain::{
        categories::MockCategoriesService,
        dashboard::MockDashboardService,
        kyc::{MockKycService, state::KycState},
        products::{
            MockProductsService,
            records::{ProductRecord, ProductUuid},
            state::QrState,
        },
        promotions::MockPromotionsService,
        users::{
            MockUsersService,
            records::{Documents, Profile, UserRecord, UserUuid},
        },
        withdrawals::MockWithdrawalsService,
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

/// The eight bytes of a PNG signature, base64 encoded.
pub(crate) const PNG_BASE64: &str = "iVBORw0KGgo=";

/// One mock per service. A mock without expectations fails any call made to it.
pub(crate) struct Mocks {
    pub(crate) auth: MockAuthService,
    pub(crate) users: MockUsersService,
    pub(crate) products: MockProductsService,
    pub(crate) categories: MockCategoriesService,
    pub(crate) promotions: MockPromotionsService,
    pub(crate) kyc: MockKycService,
    pub(crate) withdrawals: MockWithdrawalsService,
    pub(crate) dashboard: MockDashboardService,
}

impl Mocks {
    pub(crate) fn new() -> Self {
        Self {
            auth: MockAuthService::new(),
            users: MockUsersService::new(),
            products: MockProductsService::new(),
            categories: MockCategoriesService::new(),
            promotions: MockPromotionsService::new(),
            kyc: MockKycService::new(),
            withdrawals: MockWithdrawalsService::new(),
            dashboard: MockDashboardService::new(),
        }
    }

    pub(crate) fn into_state(self) -> Arc<State> {
        State::from_app_context(AppContext {
            auth: Arc::new(self.auth),
            users: Arc::new(self.users),
            products: Arc::new(self.products),
            categories: Arc::new(self.categories),
            promotions: Arc::new(self.promotions),
            kyc: Arc::new(self.kyc),
            withdrawals: Arc::new(self.withdrawals),
            dashboard: Arc::new(self.dashboard),
        })
    }
}

#[salvo::handler]
async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_principal(Principal::User(TEST_USER_UUID));
    ctrl.call_next(req, depot, res).await;
}

#[salvo::handler]
async fn inject_admin(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_principal(Principal::Admin);
    ctrl.call_next(req, depot, res).await;
}

/// A service with no signed-in principal.
pub(crate) fn public_service(mocks: Mocks, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(mocks.into_state())).push(route))
}

/// A service where every request is signed in as [`TEST_USER_UUID`].
pub(crate) fn user_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_user)
            .push(route),
    )
}

/// A service where every request is signed in as the administrator.
pub(crate) fn admin_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject_admin)
            .push(route),
    )
}

pub(crate) fn make_user(uuid: UserUuid) -> UserRecord {
    UserRecord {
        uuid,
        user_code: "USRAB12CD34EF".to_string(),
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        coins_earned: 0,
        profile: Profile::default(),
        documents: Documents::default(),
        kyc: KycState::Incomplete,
        is_profile_complete: false,
        deletion_scheduled_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_product(product_code: &str) -> ProductRecord {
    ProductRecord {
        uuid: ProductUuid::from_uuid(Uuid::nil()),
        product_code: product_code.to_string(),
        name: "Orange Soda".to_string(),
        category_uuid: None,
        category_name: None,
        coin_reward: 500,
        image_url: None,
        qr_image_url: format!("http://media.test/media/qr-codes/{product_code}.svg"),
        qr_payload: format!(
            r#"{{"productId":"{product_code}","type":"PRODUCT_QR","timestamp":0,"hash":"0000000000000000"}}"#
        ),
        qr: QrState::Active,
        redeemed_by_name: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
