//! Categories service.

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
        categories::{
            data::{CategoryUpdate, NewCategory},
            errors::CategoriesServiceError,
            records::{CategoryRecord, CategoryUuid},
            repository::PgCategoriesRepository,
        },
        users::validation,
    },
    media::{MediaStore, folders},
};

#[derive(Clone)]
pub struct PgCategoriesService {
    db: Db,
    repository: PgCategoriesRepository,
    media: Arc<dyn MediaStore>,
}

impl Debug for PgCategoriesService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgCategoriesService")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl PgCategoriesService {
    #[must_use]
    pub fn new(db: Db, media: Arc<dyn MediaStore>) -> Self {
        Self {
            db,
            repository: PgCategoriesRepository::new(),
            media,
        }
    }
}

#[async_trait]
impl CategoriesService for PgCategoriesService {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let categories = self.repository.list_categories(&mut tx).await?;

        tx.commit().await?;

        Ok(categories)
    }

    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        let name = category.name.trim();

        validation::required("name", name)?;

        let image_url = match category.image {
            Some(image) => Some(self.media.put(folders::CATEGORIES, image).await?),
            None => None,
        };

        let created = async {
            let mut tx = self.db.begin().await?;

            let created = self
                .repository
                .create_category(&mut tx, CategoryUuid::new(), name, image_url.as_deref())
                .await?;

            tx.commit().await?;

            Ok::<_, sqlx::Error>(created)
        }
        .await;

        match created {
            Ok(created) => {
                info!(category = %created.uuid, name = %created.name, "category created");

                Ok(created)
            }
            Err(error) => {
                if let Some(url) = &image_url {
                    self.media.remove(url).await;
                }

                Err(error.into())
            }
        }
    }

    async fn update_category(
        &self,
        category: CategoryUuid,
        update: CategoryUpdate,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        let name = update.name.as_deref().map(str::trim);

        if let Some(name) = name {
            validation::required("name", name)?;
        }

        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_category(&mut tx, category).await?;

        let image_url = match update.image {
            Some(image) => Some(self.media.put(folders::CATEGORIES, image).await?),
            None => None,
        };

        let updated = async {
            let updated = self
                .repository
                .update_category(
                    &mut tx,
                    category,
                    name.unwrap_or(&current.name),
                    image_url.as_deref().or(current.image_url.as_deref()),
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

    async fn delete_category(&self, category: CategoryUuid) -> Result<(), CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let image_url = self
            .repository
            .delete_category(&mut tx, category)
            .await?
            .ok_or(CategoriesServiceError::NotFound)?;

        tx.commit().await?;

        if let Some(url) = image_url {
            self.media.remove(&url).await;
        }

        info!(category = %category, "category deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CategoriesService: Send + Sync {
    /// All categories, by name.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CategoriesServiceError>;

    /// Create a category with an optional image.
    async fn create_category(
        &self,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Rename a category or replace its image.
    async fn update_category(
        &self,
        category: CategoryUuid,
        update: CategoryUpdate,
    ) -> Result<CategoryRecord, CategoriesServiceError>;

    /// Delete a category. Products in it become uncategorized.
    async fn delete_category(&self, category: CategoryUuid) -> Result<(), CategoriesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test::{TestContext, helpers};

    use super::*;

    fn named(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn create_and_list_categories() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.categories.create_category(named("Snacks")).await?;
        ctx.categories.create_category(named("  Beverages ")).await?;

        let names: Vec<_> = ctx
            .categories
            .list_categories()
            .await?
            .into_iter()
            .map(|category| category.name)
            .collect();

        assert_eq!(names, ["Beverages", "Snacks"]);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.categories.create_category(named("Snacks")).await?;

        let result = ctx.categories.create_category(named("Snacks")).await;

        assert!(
            matches!(result, Err(CategoriesServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn rename_keeps_the_image() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .categories
            .create_category(NewCategory {
                name: "Snacks".to_string(),
                image: Some(helpers::png()),
            })
            .await?;

        let renamed = ctx
            .categories
            .update_category(
                created.uuid,
                CategoryUpdate {
                    name: Some("Savoury Snacks".to_string()),
                    image: None,
                },
            )
            .await?;

        assert_eq!(renamed.name, "Savoury Snacks");
        assert_eq!(renamed.image_url, created.image_url);

        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_category_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.categories.delete_category(CategoryUuid::new()).await;

        assert!(
            matches!(result, Err(CategoriesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }
}
