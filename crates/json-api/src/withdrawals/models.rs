//! Withdrawal response bodies

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use qrewards_app::domain::withdrawals::records::{WithdrawalHistoryEntry, WithdrawalRecord};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WithdrawalResponse {
    pub uuid: Uuid,
    pub user_uuid: Uuid,
    pub user_name: String,
    pub user_id: String,
    pub amount: u64,

    /// `pending`, `approved` or `rejected`
    pub status: String,

    pub processed_at: Option<String>,
    pub created_at: String,
}

impl From<WithdrawalRecord> for WithdrawalResponse {
    fn from(withdrawal: WithdrawalRecord) -> Self {
        Self {
            uuid: withdrawal.uuid.into_uuid(),
            user_uuid: withdrawal.user_uuid.into_uuid(),
            user_name: withdrawal.user_name,
            user_id: withdrawal.user_code,
            amount: withdrawal.amount,
            status: withdrawal.state.status().to_string(),
            processed_at: withdrawal.state.processed_at().map(|at| at.to_string()),
            created_at: withdrawal.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WithdrawalsResponse {
    /// Withdrawal requests, newest first
    pub withdrawals: Vec<WithdrawalResponse>,
}

impl From<Vec<WithdrawalRecord>> for WithdrawalsResponse {
    fn from(withdrawals: Vec<WithdrawalRecord>) -> Self {
        Self {
            withdrawals: withdrawals.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WithdrawalHistoryResponse {
    pub uuid: Uuid,

    /// The approved request this payout settled
    pub request_uuid: Uuid,

    pub amount: u64,
    pub processed_at: String,
}

impl From<WithdrawalHistoryEntry> for WithdrawalHistoryResponse {
    fn from(entry: WithdrawalHistoryEntry) -> Self {
        Self {
            uuid: entry.uuid.into_uuid(),
            request_uuid: entry.request_uuid.into_uuid(),
            amount: entry.amount,
            processed_at: entry.processed_at.to_string(),
        }
    }
}
