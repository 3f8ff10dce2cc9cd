//! KYC review lifecycle.
//!
//! The aggregate review state lives on the user; per-document decisions are
//! recorded separately and never move the aggregate state.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::domain::users::records::{DocumentRecord, DocumentStatus, UserRecord};

/// Flat KYC status, as stored and as used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KycStatus {
    Incomplete,
    Pending,
    Approved,
    Rejected,
}

impl KycStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for KycStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incomplete" => Ok(Self::Incomplete),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// KYC review state of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycState {
    Incomplete,
    Pending {
        requested_at: Timestamp,
    },
    Approved {
        requested_at: Option<Timestamp>,
        approved_at: Timestamp,
    },
    Rejected {
        requested_at: Option<Timestamp>,
        reason: String,
    },
}

/// Something that happens to a KYC review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KycEvent {
    /// The profile just became complete.
    Submit { at: Timestamp },
    Approve { at: Timestamp },
    Reject { reason: String },
}

/// Admin decision on a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentDecision {
    Verify,
    Reject { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KycTransitionError {
    #[error("KYC review is not pending")]
    NotPending,

    #[error("KYC review cannot be submitted from its current state")]
    NotSubmittable,

    #[error("a rejection reason is required")]
    MissingReason,

    #[error("document has not been submitted")]
    DocumentNotSubmitted,
}

impl KycState {
    #[must_use]
    pub const fn status(&self) -> KycStatus {
        match self {
            Self::Incomplete => KycStatus::Incomplete,
            Self::Pending { .. } => KycStatus::Pending,
            Self::Approved { .. } => KycStatus::Approved,
            Self::Rejected { .. } => KycStatus::Rejected,
        }
    }

    /// Profile data is frozen while a review is pending or after approval.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        matches!(self, Self::Pending { .. } | Self::Approved { .. })
    }

    #[must_use]
    pub const fn requested_at(&self) -> Option<Timestamp> {
        match self {
            Self::Incomplete => None,
            Self::Pending { requested_at } => Some(*requested_at),
            Self::Approved { requested_at, .. } | Self::Rejected { requested_at, .. } => {
                *requested_at
            }
        }
    }

    #[must_use]
    pub const fn approved_at(&self) -> Option<Timestamp> {
        match self {
            Self::Approved { approved_at, .. } => Some(*approved_at),
            Self::Incomplete | Self::Pending { .. } | Self::Rejected { .. } => None,
        }
    }

    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason, .. } => Some(reason),
            Self::Incomplete | Self::Pending { .. } | Self::Approved { .. } => None,
        }
    }

    /// Compute the next state for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`KycTransitionError`] when the event is not valid from the current
    /// state, or a rejection carries a blank reason.
    pub fn transition(&self, event: KycEvent) -> Result<Self, KycTransitionError> {
        match (self, event) {
            (Self::Incomplete | Self::Rejected { .. }, KycEvent::Submit { at }) => {
                Ok(Self::Pending { requested_at: at })
            }
            (Self::Pending { .. } | Self::Approved { .. }, KycEvent::Submit { .. }) => {
                Err(KycTransitionError::NotSubmittable)
            }
            (Self::Pending { requested_at }, KycEvent::Approve { at }) => Ok(Self::Approved {
                requested_at: Some(*requested_at),
                approved_at: at,
            }),
            (Self::Pending { requested_at }, KycEvent::Reject { reason }) => {
                let reason = required_reason(&reason)?;

                Ok(Self::Rejected {
                    requested_at: Some(*requested_at),
                    reason,
                })
            }
            (_, KycEvent::Approve { .. } | KycEvent::Reject { .. }) => {
                Err(KycTransitionError::NotPending)
            }
        }
    }
}

/// Apply `event` to a user, including its effects on documents and the
/// profile-complete flag.
///
/// # Errors
///
/// Returns [`KycTransitionError`] if the transition is refused; the user is left
/// untouched in that case.
pub fn apply_kyc_event(user: &mut UserRecord, event: KycEvent) -> Result<(), KycTransitionError> {
    let next = user.kyc.transition(event)?;

    match &next {
        KycState::Approved { .. } => {
            for (_, document) in user.documents.iter_mut() {
                document.status = DocumentStatus::Verified;
                document.rejection_reason = None;
            }
        }
        KycState::Rejected { .. } => {
            for (_, document) in user.documents.iter_mut() {
                document.status = DocumentStatus::Incomplete;
            }

            user.is_profile_complete = false;
        }
        KycState::Incomplete | KycState::Pending { .. } => {}
    }

    user.kyc = next;

    Ok(())
}

/// Record an admin decision on one document.
///
/// # Errors
///
/// Returns [`KycTransitionError::DocumentNotSubmitted`] for a document that was
/// never uploaded, or [`KycTransitionError::MissingReason`] for a blank rejection.
pub fn decide_document(
    document: &mut DocumentRecord,
    decision: DocumentDecision,
) -> Result<(), KycTransitionError> {
    if document.status == DocumentStatus::Incomplete {
        return Err(KycTransitionError::DocumentNotSubmitted);
    }

    match decision {
        DocumentDecision::Verify => {
            document.status = DocumentStatus::Verified;
            document.rejection_reason = None;
        }
        DocumentDecision::Reject { reason } => {
            document.rejection_reason = Some(required_reason(&reason)?);
            document.status = DocumentStatus::Rejected;
        }
    }

    Ok(())
}

fn required_reason(reason: &str) -> Result<String, KycTransitionError> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(KycTransitionError::MissingReason);
    }

    Ok(reason.to_string())
}
