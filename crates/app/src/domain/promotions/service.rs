//! Promotions service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        promotions::{
            errors::PromotionsServiceError,
            records::{NewPromotion, PromotionRecord, PromotionUuid},
            repository::PgPromotionsRepository,
        },
        users::validation,
    },
    media::{MediaStore, folders},
};

#[derive(Clone)]
pub struct PgPromotionsService {
    db: Db,
    repository: PgPromotionsRepository,
    media: Arc<dyn MediaStore>,
}

impl Debug for PgPromotionsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgPromotionsService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgPromotionsService {
    #[must_use]
    pub fn new(db: Db, media: Arc<dyn MediaStore>) -> Self {
        Self {
            db,
            repository: PgPromotionsRepository::new(),
            media,
        }
    }
}

#[async_trait]
impl PromotionsService for PgPromotionsService {
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let promotions = self.repository.list_promotions(&mut tx).await?;

        tx.commit().await?;

        Ok(promotions)
    }

    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<PromotionRecord, PromotionsServiceError> {
        let title = promotion.title.trim();

        validation::required("title", title)?;

        let image_url = self.media.put(folders::PROMOTIONS, promotion.image).await?;

        let created = async {
            let mut tx = self.db.begin().await?;

            let created = self
                .repository
                .create_promotion(&mut tx, PromotionUuid::new(), title, &image_url)
                .await?;

            tx.commit().await?;

            Ok::<_, sqlx::Error>(created)
        }
        .await;

        match created {
            Ok(created) => {
                info!(promotion = %created.uuid, "promotion created");

                Ok(created)
            }
            Err(error) => {
                self.media.remove(&image_url).await;

                Err(error.into())
            }
        }
    }

    async fn delete_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<(), PromotionsServiceError> {
        let mut tx = self.db.begin().await?;

        let image_url = self
            .repository
            .delete_promotion(&mut tx, promotion)
            .await?
            .ok_or(PromotionsServiceError::NotFound)?;

        tx.commit().await?;

        self.media.remove(&image_url).await;

        info!(promotion = %promotion, "promotion deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// All promotions, newest first.
    async fn list_promotions(&self) -> Result<Vec<PromotionRecord>, PromotionsServiceError>;

    /// Store the banner image and create the promotion.
    async fn create_promotion(
        &self,
        promotion: NewPromotion,
    ) -> Result<PromotionRecord, PromotionsServiceError>;

    /// Delete a promotion and release its image.
    async fn delete_promotion(
        &self,
        promotion: PromotionUuid,
    ) -> Result<(), PromotionsServiceError>;
}
