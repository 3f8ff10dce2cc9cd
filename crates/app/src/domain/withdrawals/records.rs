//! Withdrawal Records

use jiff::Timestamp;

use crate::{
    domain::{users::records::UserUuid, withdrawals::state::WithdrawalState},
    uuids::TypedUuid,
};

/// Withdrawal Request UUID
pub type WithdrawalUuid = TypedUuid<WithdrawalRecord>;

/// Withdrawal History Entry UUID
pub type WithdrawalHistoryUuid = TypedUuid<WithdrawalHistoryEntry>;

/// Withdrawal Request Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRecord {
    pub uuid: WithdrawalUuid,
    pub user_uuid: UserUuid,
    pub user_name: String,
    pub user_code: String,
    pub amount: u64,
    pub state: WithdrawalState,
    pub created_at: Timestamp,
}

/// A paid-out withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalHistoryEntry {
    pub uuid: WithdrawalHistoryUuid,
    pub request_uuid: WithdrawalUuid,
    pub amount: u64,
    pub processed_at: Timestamp,
}
