//! Product QR lifecycle.
//!
//! A QR code starts `active`, can be toggled between `active` and `disabled` by
//! an admin, and is consumed exactly once by a redemption. `scanned` is terminal.

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::domain::{kyc::state::UnknownStatus, users::records::UserUuid};

/// Flat QR status, as stored and as used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QrStatus {
    Active,
    Scanned,
    Disabled,
}

impl QrStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Scanned => "scanned",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for QrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QrStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "scanned" => Ok(Self::Scanned),
            "disabled" => Ok(Self::Disabled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// QR state of a product. The redeemer is only known once scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrState {
    Active,
    Disabled,
    Scanned { by: UserUuid, at: Timestamp },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrEvent {
    Redeem { by: UserUuid, at: Timestamp },
    Enable,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QrTransitionError {
    #[error("QR code has already been redeemed")]
    AlreadyRedeemed { by: UserUuid, at: Timestamp },

    #[error("QR code is disabled")]
    Inactive,
}

impl QrState {
    #[must_use]
    pub const fn status(self) -> QrStatus {
        match self {
            Self::Active => QrStatus::Active,
            Self::Disabled => QrStatus::Disabled,
            Self::Scanned { .. } => QrStatus::Scanned,
        }
    }

    /// Compute the next state for `event`.
    ///
    /// # Errors
    ///
    /// Returns [`QrTransitionError::AlreadyRedeemed`] for any event on a scanned
    /// code and [`QrTransitionError::Inactive`] when redeeming a disabled one.
    pub const fn transition(self, event: QrEvent) -> Result<Self, QrTransitionError> {
        match (self, event) {
            (Self::Scanned { by, at }, _) => Err(QrTransitionError::AlreadyRedeemed { by, at }),
            (Self::Active, QrEvent::Redeem { by, at }) => Ok(Self::Scanned { by, at }),
            (Self::Disabled, QrEvent::Redeem { .. }) => Err(QrTransitionError::Inactive),
            (Self::Active | Self::Disabled, QrEvent::Enable) => Ok(Self::Active),
            (Self::Active | Self::Disabled, QrEvent::Disable) => Ok(Self::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn active_code_redeems_into_scanned() -> TestResult {
        let by = UserUuid::new();
        let at = Timestamp::now();

        assert_eq!(
            QrState::Active.transition(QrEvent::Redeem { by, at })?,
            QrState::Scanned { by, at }
        );

        Ok(())
    }

    #[test]
    fn disabled_code_cannot_be_redeemed() {
        let result = QrState::Disabled.transition(QrEvent::Redeem {
            by: UserUuid::new(),
            at: Timestamp::now(),
        });

        assert_eq!(result, Err(QrTransitionError::Inactive));
    }

    #[test]
    fn scanned_is_terminal_for_every_event() {
        let by = UserUuid::new();
        let at = Timestamp::UNIX_EPOCH;
        let state = QrState::Scanned { by, at };

        for event in [
            QrEvent::Redeem {
                by: UserUuid::new(),
                at: Timestamp::now(),
            },
            QrEvent::Enable,
            QrEvent::Disable,
        ] {
            assert_eq!(
                state.transition(event),
                Err(QrTransitionError::AlreadyRedeemed { by, at }),
                "{event:?} on a scanned code"
            );
        }
    }

    #[test]
    fn toggles_are_idempotent() -> TestResult {
        for state in [QrState::Active, QrState::Disabled] {
            assert_eq!(state.transition(QrEvent::Enable)?, QrState::Active);
            assert_eq!(state.transition(QrEvent::Disable)?, QrState::Disabled);
        }

        Ok(())
    }

    #[test]
    fn status_parses_its_own_name() {
        for status in [QrStatus::Active, QrStatus::Scanned, QrStatus::Disabled] {
            assert_eq!(status.as_str().parse::<QrStatus>(), Ok(status));
        }
    }
}
