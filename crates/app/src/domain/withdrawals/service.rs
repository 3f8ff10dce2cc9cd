//! Withdrawals service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::{Db, db_now},
    domain::{
        users::{records::UserUuid, repository::PgUsersRepository},
        withdrawals::{
            errors::WithdrawalsServiceError,
            records::{
                WithdrawalHistoryEntry, WithdrawalHistoryUuid, WithdrawalRecord, WithdrawalUuid,
            },
            repository::PgWithdrawalsRepository,
            state::{WithdrawalDecision, WithdrawalState, WithdrawalStatus, check_request},
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgWithdrawalsService {
    db: Db,
    repository: PgWithdrawalsRepository,
    users: PgUsersRepository,
}

impl PgWithdrawalsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgWithdrawalsRepository::new(),
            users: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl WithdrawalsService for PgWithdrawalsService {
    async fn create_request(
        &self,
        user: UserUuid,
        amount: u64,
    ) -> Result<WithdrawalRecord, WithdrawalsServiceError> {
        if amount == 0 {
            return Err(WithdrawalsServiceError::InvalidAmount);
        }

        let mut tx = self.db.begin().await?;

        let record = self
            .users
            .get_user(&mut tx, user)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => WithdrawalsServiceError::UserNotFound,
                error => error.into(),
            })?;

        check_request(amount, record.kyc.status(), record.coins_earned)?;

        let created = self
            .repository
            .create_withdrawal(&mut tx, WithdrawalUuid::new(), user, amount)
            .await?;

        tx.commit().await?;

        info!(withdrawal = %created.uuid, user = %user, amount, "withdrawal requested");

        Ok(created)
    }

    async fn list_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<WithdrawalRecord>, WithdrawalsServiceError> {
        let mut tx = self.db.begin().await?;

        let withdrawals = self
            .repository
            .list_withdrawals(&mut tx, Some(user), None)
            .await?;

        tx.commit().await?;

        Ok(withdrawals)
    }

    async fn list(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRecord>, WithdrawalsServiceError> {
        let mut tx = self.db.begin().await?;

        let withdrawals = self
            .repository
            .list_withdrawals(&mut tx, None, status)
            .await?;

        tx.commit().await?;

        Ok(withdrawals)
    }

    async fn decide(
        &self,
        withdrawal: WithdrawalUuid,
        decision: WithdrawalDecision,
    ) -> Result<WithdrawalRecord, WithdrawalsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.get_withdrawal(&mut tx, withdrawal).await?;

        let processed_at = db_now();
        let next = current.state.transition(decision, processed_at)?;

        if self
            .repository
            .decide_withdrawal(&mut tx, withdrawal, next)
            .await?
            == 0
        {
            warn!(withdrawal = %withdrawal, "withdrawal decided concurrently");

            return Err(WithdrawalsServiceError::AlreadyProcessed);
        }

        if let WithdrawalState::Approved { .. } = next {
            let balance = self
                .users
                .debit_coins(&mut tx, current.user_uuid, current.amount)
                .await?
                .ok_or(WithdrawalsServiceError::InsufficientBalance)?;

            let entry = WithdrawalHistoryEntry {
                uuid: WithdrawalHistoryUuid::new(),
                request_uuid: withdrawal,
                amount: current.amount,
                processed_at,
            };

            self.repository
                .insert_history(&mut tx, current.user_uuid, &entry)
                .await?;

            info!(
                withdrawal = %withdrawal,
                user = %current.user_uuid,
                amount = current.amount,
                balance,
                "withdrawal paid out"
            );
        }

        let decided = self.repository.get_withdrawal(&mut tx, withdrawal).await?;

        tx.commit().await?;

        info!(withdrawal = %withdrawal, status = %decided.state.status(), "withdrawal decided");

        Ok(decided)
    }

    async fn history(
        &self,
        user: UserUuid,
    ) -> Result<Vec<WithdrawalHistoryEntry>, WithdrawalsServiceError> {
        let mut tx = self.db.begin().await?;

        let entries = self.repository.list_history(&mut tx, user).await?;

        tx.commit().await?;

        Ok(entries)
    }
}

#[automock]
#[async_trait]
pub trait WithdrawalsService: Send + Sync {
    /// Ask to withdraw `amount` coins. Requires an approved KYC review and a
    /// covering balance; nothing is debited until an admin approves.
    async fn create_request(
        &self,
        user: UserUuid,
        amount: u64,
    ) -> Result<WithdrawalRecord, WithdrawalsServiceError>;

    /// A user's own requests, newest first.
    async fn list_for_user(
        &self,
        user: UserUuid,
    ) -> Result<Vec<WithdrawalRecord>, WithdrawalsServiceError>;

    /// Every request, optionally narrowed to one status.
    async fn list(
        &self,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRecord>, WithdrawalsServiceError>;

    /// Approve or reject a pending request. Approval debits the balance.
    async fn decide(
        &self,
        withdrawal: WithdrawalUuid,
        decision: WithdrawalDecision,
    ) -> Result<WithdrawalRecord, WithdrawalsServiceError>;

    /// A user's paid-out withdrawals, newest first.
    async fn history(
        &self,
        user: UserUuid,
    ) -> Result<Vec<WithdrawalHistoryEntry>, WithdrawalsServiceError>;
}
