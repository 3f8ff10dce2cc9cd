//! KYC Data

/// Admin decision on a pending KYC review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycDecision {
    Approve,
    Reject { reason: String },
}
