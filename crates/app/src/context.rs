//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    config::AppConfig,
    database::{self, Db},
    domain::{
        categories::{CategoriesService, PgCategoriesService},
        dashboard::{DashboardService, PgDashboardService},
        kyc::{KycService, PgKycService},
        products::{PgProductsService, ProductsService},
        promotions::{PgPromotionsService, PromotionsService},
        users::{PgUsersService, UsersService},
        withdrawals::{PgWithdrawalsService, WithdrawalsService},
    },
    media::{FsMediaStore, MediaStore},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UsersService>,
    pub products: Arc<dyn ProductsService>,
    pub categories: Arc<dyn CategoriesService>,
    pub promotions: Arc<dyn PromotionsService>,
    pub kyc: Arc<dyn KycService>,
    pub withdrawals: Arc<dyn WithdrawalsService>,
    pub dashboard: Arc<dyn DashboardService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(Db::new(pool), config))
    }

    /// Build application context over an existing database handle.
    #[must_use]
    pub fn from_db(db: Db, config: &AppConfig) -> Self {
        let media: Arc<dyn MediaStore> = Arc::new(FsMediaStore::new(
            config.media_root.clone(),
            &config.media_public_url,
        ));

        Self {
            auth: Arc::new(PgAuthService::new(db.clone(), config)),
            users: Arc::new(PgUsersService::new(
                db.clone(),
                media.clone(),
                config.deletion_grace_period,
            )),
            products: Arc::new(PgProductsService::new(
                db.clone(),
                media.clone(),
                config.qr_secret.clone(),
            )),
            categories: Arc::new(PgCategoriesService::new(db.clone(), media.clone())),
            promotions: Arc::new(PgPromotionsService::new(db.clone(), media)),
            kyc: Arc::new(PgKycService::new(db.clone())),
            withdrawals: Arc::new(PgWithdrawalsService::new(db.clone())),
            dashboard: Arc::new(PgDashboardService::new(db)),
        }
    }
}
