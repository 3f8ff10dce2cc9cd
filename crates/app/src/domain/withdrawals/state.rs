//! Withdrawal request lifecycle.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::domain::kyc::state::{KycStatus, UnknownStatus};

/// Flat withdrawal status, as stored and as used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalState {
    Pending,
    Approved { processed_at: Timestamp },
    Rejected { processed_at: Timestamp },
}

/// Admin decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WithdrawalTransitionError {
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("KYC must be approved before withdrawing")]
    KycNotApproved,

    #[error("insufficient coin balance")]
    InsufficientBalance,

    #[error("withdrawal request has already been processed")]
    AlreadyProcessed,
}

impl WithdrawalState {
    #[must_use]
    pub const fn status(self) -> WithdrawalStatus {
        match self {
            Self::Pending => WithdrawalStatus::Pending,
            Self::Approved { .. } => WithdrawalStatus::Approved,
            Self::Rejected { .. } => WithdrawalStatus::Rejected,
        }
    }

    #[must_use]
    pub const fn processed_at(self) -> Option<Timestamp> {
        match self {
            Self::Pending => None,
            Self::Approved { processed_at } | Self::Rejected { processed_at } => {
                Some(processed_at)
            }
        }
    }

    /// Compute the state after `decision`.
    ///
    /// # Errors
    ///
    /// Returns [`WithdrawalTransitionError::AlreadyProcessed`] unless the request
    /// is pending.
    pub const fn transition(
        self,
        decision: WithdrawalDecision,
        at: Timestamp,
    ) -> Result<Self, WithdrawalTransitionError> {
        match (self, decision) {
            (Self::Pending, WithdrawalDecision::Approve) => {
                Ok(Self::Approved { processed_at: at })
            }
            (Self::Pending, WithdrawalDecision::Reject) => Ok(Self::Rejected { processed_at: at }),
            (Self::Approved { .. } | Self::Rejected { .. }, _) => {
                Err(WithdrawalTransitionError::AlreadyProcessed)
            }
        }
    }
}

/// Check whether a user may ask to withdraw `amount`.
///
/// # Errors
///
/// Checked in order: a zero amount, a KYC review that is not approved, and a
/// balance below `amount`.
pub const fn check_request(
    amount: u64,
    kyc: KycStatus,
    balance: u64,
) -> Result<(), WithdrawalTransitionError> {
    if amount == 0 {
        return Err(WithdrawalTransitionError::InvalidAmount);
    }

    if !matches!(kyc, KycStatus::Approved) {
        return Err(WithdrawalTransitionError::KycNotApproved);
    }

    if amount > balance {
        return Err(WithdrawalTransitionError::InsufficientBalance);
    }

    Ok(())
}
