//! Dashboard service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::dashboard::{
        errors::DashboardServiceError, records::DashboardSummary,
        repository::PgDashboardRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgDashboardService {
    db: Db,
    repository: PgDashboardRepository,
}

impl PgDashboardService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgDashboardRepository::new(),
        }
    }
}

#[async_trait]
impl DashboardService for PgDashboardService {
    async fn summary(&self) -> Result<DashboardSummary, DashboardServiceError> {
        let mut tx = self.db.begin().await?;

        let summary = self.repository.summary(&mut tx).await?;

        tx.commit().await?;

        Ok(summary)
    }
}

#[automock]
#[async_trait]
pub trait DashboardService: Send + Sync {
    async fn summary(&self) -> Result<DashboardSummary, DashboardServiceError>;
}
