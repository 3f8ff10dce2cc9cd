//! Products service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info, warn};

use crate::{
    config::Secret,
    database::{Db, db_now},
    domain::{
        products::{
            data::{
                NewProduct, ProductFilter, ProductUpdate, RedemptionOutcome,
                check_coin_reward, generate_product_code, normalize_product_code,
            },
            errors::ProductsServiceError,
            records::{ProductRecord, ProductUuid},
            repository::{NewProductRow, PgProductsRepository, ProductRow},
            state::{QrEvent, QrTransitionError},
        },
        qr::{QrPayload, validate_payload},
        users::{
            records::{RewardEntry, RewardEntryUuid, UserUuid},
            repository::PgUsersRepository,
            validation,
        },
    },
    media::{MediaStore, MediaUpload, folders},
};

#[derive(Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
    users: PgUsersRepository,
    media: Arc<dyn MediaStore>,
    qr_secret: Secret,
}

impl Debug for PgProductsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgProductsService")
            .field("db", &self.db)
            .field("qr_secret", &self.qr_secret)
            .finish_non_exhaustive()
    }
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db, media: Arc<dyn MediaStore>, qr_secret: Secret) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
            users: PgUsersRepository::new(),
            media,
            qr_secret,
        }
    }

    /// Store the QR image and the optional product image, returning their URLs.
    async fn store_images(
        &self,
        qr_svg: String,
        image: Option<MediaUpload>,
    ) -> Result<(String, Option<String>), ProductsServiceError> {
        let qr_image_url = self
            .media
            .put(folders::QR_CODES, MediaUpload::svg(qr_svg))
            .await?;

        let image_url = match image {
            Some(image) => match self.media.put(folders::PRODUCTS, image).await {
                Ok(url) => Some(url),
                Err(error) => {
                    self.media.remove(&qr_image_url).await;

                    return Err(error.into());
                }
            },
            None => None,
        };

        Ok((qr_image_url, image_url))
    }

    /// Explain why a refused write did not apply, from the row as it is now.
    async fn refused(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        product_code: &str,
        event: QrEvent,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let current = self.repository.get_product(tx, product_code).await?;

        match current.qr.transition(event) {
            Err(error) => Err(error.into()),
            Ok(_) => {
                warn!(product_code, status = %current.qr.status(), "QR update refused");

                Err(ProductsServiceError::ProductInactive)
            }
        }
    }
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx, filter).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(&self, product_code: &str) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product_code).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let name = product.name.trim();

        validation::required("name", name)?;
        check_coin_reward(product.coin_reward)?;

        let product_code = match product.product_code.as_deref() {
            Some(code) => normalize_product_code(code)?,
            None => generate_product_code(),
        };

        let payload = QrPayload::issue(&product_code, Timestamp::now(), self.qr_secret.expose());
        let qr_payload = payload.to_text()?;
        let qr_svg = payload.render_svg()?;

        let (qr_image_url, image_url) = self.store_images(qr_svg, product.image).await?;

        let created = async {
            let mut tx = self.db.begin().await?;

            let created = self
                .repository
                .create_product(
                    &mut tx,
                    &NewProductRow {
                        uuid: ProductUuid::new(),
                        product_code: &product_code,
                        name,
                        category: product.category,
                        coin_reward: product.coin_reward,
                        image_url: image_url.as_deref(),
                        qr_image_url: &qr_image_url,
                        qr_payload: &qr_payload,
                    },
                )
                .await?;

            tx.commit().await?;

            Ok::<_, sqlx::Error>(created)
        }
        .await;

        match created {
            Ok(created) => {
                info!(
                    product_code = %created.product_code,
                    coin_reward = created.coin_reward,
                    "product created"
                );

                Ok(created)
            }
            Err(error) => {
                self.media.remove(&qr_image_url).await;

                if let Some(url) = &image_url {
                    self.media.remove(url).await;
                }

                Err(error.into())
            }
        }
    }

    async fn update_product(
        &self,
        product_code: &str,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let name = update.name.as_deref().map(str::trim);

        if let Some(name) = name {
            validation::required("name", name)?;
        }

        if let Some(coin_reward) = update.coin_reward {
            check_coin_reward(coin_reward)?;
        }

        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_product(&mut tx, product_code).await?;

        let image_url = match update.image {
            Some(image) => Some(self.media.put(folders::PRODUCTS, image).await?),
            None => None,
        };

        let updated = async {
            let updated = self
                .repository
                .update_product(
                    &mut tx,
                    product_code,
                    &ProductRow {
                        name: name.unwrap_or(&current.name),
                        category: update.category.unwrap_or(current.category_uuid),
                        coin_reward: update.coin_reward.unwrap_or(current.coin_reward),
                        image_url: image_url.as_deref().or(current.image_url.as_deref()),
                    },
                )
                .await?;

            tx.commit().await?;

            Ok::<_, sqlx::Error>(updated)
        }
        .await;

        match updated {
            Ok(updated) => {
                if let (Some(_), Some(previous)) = (&image_url, &current.image_url) {
                    self.media.remove(previous).await;
                }

                Ok(updated)
            }
            Err(error) => {
                if let Some(url) = &image_url {
                    self.media.remove(url).await;
                }

                Err(error.into())
            }
        }
    }

    async fn delete_product(&self, product_code: &str) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let (image_url, qr_image_url) = self
            .repository
            .delete_product(&mut tx, product_code)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        tx.commit().await?;

        self.media.remove(&qr_image_url).await;

        if let Some(url) = image_url {
            self.media.remove(&url).await;
        }

        info!(product_code, "product deleted");

        Ok(())
    }

    async fn set_qr_enabled(
        &self,
        product_code: &str,
        enabled: bool,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let event = if enabled {
            QrEvent::Enable
        } else {
            QrEvent::Disable
        };

        let mut tx = self.db.begin().await?;

        let current = self.repository.get_product(&mut tx, product_code).await?;

        let next = current.qr.transition(event)?;

        let rows_affected = self
            .repository
            .set_qr_status(&mut tx, product_code, next.status())
            .await?;

        if rows_affected == 0 {
            return self.refused(&mut tx, product_code, event).await;
        }

        let updated = self.repository.get_product(&mut tx, product_code).await?;

        tx.commit().await?;

        info!(product_code, status = %updated.qr.status(), "QR status changed");

        Ok(updated)
    }

    async fn redeem(
        &self,
        user: UserUuid,
        payload: Value,
    ) -> Result<RedemptionOutcome, ProductsServiceError> {
        let scanned = validate_payload(&payload)?;
        let product_code = scanned.product_code.as_str();

        let mut tx = self.db.begin().await?;

        let product = self
            .repository
            .find_product(&mut tx, product_code)
            .await?
            .ok_or(ProductsServiceError::NotFound)?;

        if !self.users.user_exists(&mut tx, user).await? {
            return Err(ProductsServiceError::UserNotFound);
        }

        if self.users.has_redeemed(&mut tx, user, product_code).await? {
            return Err(ProductsServiceError::DuplicateRedemption);
        }

        let at = db_now();
        let event = QrEvent::Redeem { by: user, at };

        if let Err(error) = product.qr.transition(event) {
            return refused_redemption(&product, error);
        }

        let rows_affected = self
            .repository
            .mark_scanned(&mut tx, product_code, user, at)
            .await?;

        if rows_affected == 0 {
            let current = self.repository.get_product(&mut tx, product_code).await?;

            debug!(product_code, status = %current.qr.status(), "lost redemption race");

            return match current.qr.transition(event) {
                Err(error) => refused_redemption(&current, error),
                Ok(_) => Err(ProductsServiceError::ProductInactive),
            };
        }

        let entry = RewardEntry {
            uuid: RewardEntryUuid::new(),
            product_code: product.product_code.clone(),
            product_name: product.name.clone(),
            category_name: product.category_name.clone(),
            coins_earned: product.coin_reward,
            redeemed_at: at,
        };

        self.users.insert_reward_entry(&mut tx, user, &entry).await?;

        let coins_earned = self
            .users
            .credit_coins(&mut tx, user, product.coin_reward)
            .await?;

        tx.commit().await?;

        info!(
            user = %user,
            product_code,
            coins = entry.coins_earned,
            balance = coins_earned,
            "product redeemed"
        );

        Ok(RedemptionOutcome::Redeemed {
            entry,
            coins_earned,
        })
    }
}

/// Map a refused redemption onto its outcome. A consumed code is reported, not
/// raised.
fn refused_redemption(
    product: &ProductRecord,
    error: QrTransitionError,
) -> Result<RedemptionOutcome, ProductsServiceError> {
    match error {
        QrTransitionError::AlreadyRedeemed { at, .. } => Ok(RedemptionOutcome::AlreadyUsed {
            redeemed_by: product.redeemed_by_name.clone(),
            redeemed_at: at,
        }),
        QrTransitionError::Inactive => Err(ProductsServiceError::ProductInactive),
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Products matching `filter`, newest first.
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    async fn get_product(&self, product_code: &str) -> Result<ProductRecord, ProductsServiceError>;

    /// Create a product and issue its QR code.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    async fn update_product(
        &self,
        product_code: &str,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    async fn delete_product(&self, product_code: &str) -> Result<(), ProductsServiceError>;

    /// Enable or disable a product's QR code. Scanned codes cannot be toggled.
    async fn set_qr_enabled(
        &self,
        product_code: &str,
        enabled: bool,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Redeem a scanned QR payload for `user`.
    ///
    /// The code is consumed and the user credited atomically. A code someone else
    /// already consumed yields [`RedemptionOutcome::AlreadyUsed`].
    async fn redeem(
        &self,
        user: UserUuid,
        payload: Value,
    ) -> Result<RedemptionOutcome, ProductsServiceError>;
}
