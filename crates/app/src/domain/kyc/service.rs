//! KYC review service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::{Db, db_now},
    domain::{
        kyc::{
            data::KycDecision,
            errors::KycServiceError,
            state::{DocumentDecision, KycEvent, KycStatus, apply_kyc_event, decide_document},
        },
        users::{
            records::{DocumentType, UserRecord, UserUuid},
            repository::PgUsersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgKycService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgKycService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl KycService for PgKycService {
    async fn list_users(&self, status: KycStatus) -> Result<Vec<UserRecord>, KycServiceError> {
        let mut tx = self.db.begin().await?;

        let users = self
            .repository
            .list_users_by_kyc_status(&mut tx, status)
            .await?;

        tx.commit().await?;

        Ok(users)
    }

    async fn decide(
        &self,
        user: UserUuid,
        decision: KycDecision,
    ) -> Result<UserRecord, KycServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.repository.lock_user(&mut tx, user).await?;

        let event = match decision {
            KycDecision::Approve => KycEvent::Approve { at: db_now() },
            KycDecision::Reject { reason } => KycEvent::Reject { reason },
        };

        apply_kyc_event(&mut record, event)?;

        self.repository.save_user(&mut tx, &record).await?;

        let saved = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        info!(user = %user, status = %saved.kyc.status(), "KYC review decided");

        Ok(saved)
    }

    async fn decide_document(
        &self,
        user: UserUuid,
        document: DocumentType,
        decision: DocumentDecision,
    ) -> Result<UserRecord, KycServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.repository.lock_user(&mut tx, user).await?;

        decide_document(record.documents.get_mut(document), decision)?;

        self.repository.save_user(&mut tx, &record).await?;

        let saved = self.repository.get_user(&mut tx, user).await?;

        tx.commit().await?;

        info!(
            user = %user,
            document = %document,
            status = saved.documents.get(document).status.as_str(),
            "document reviewed"
        );

        Ok(saved)
    }
}

#[automock]
#[async_trait]
pub trait KycService: Send + Sync {
    /// Users whose review is in `status`, oldest request first.
    async fn list_users(&self, status: KycStatus) -> Result<Vec<UserRecord>, KycServiceError>;

    /// Approve or reject a pending review.
    async fn decide(
        &self,
        user: UserUuid,
        decision: KycDecision,
    ) -> Result<UserRecord, KycServiceError>;

    /// Verify or reject one submitted document. The review state is unchanged.
    async fn decide_document(
        &self,
        user: UserUuid,
        document: DocumentType,
        decision: DocumentDecision,
    ) -> Result<UserRecord, KycServiceError>;
}
