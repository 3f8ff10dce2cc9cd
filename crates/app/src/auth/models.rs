//! Auth data models.

use jiff::Timestamp;
use uuid::Uuid;

use crate::domain::users::records::UserUuid;

/// Who a session acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    User(UserUuid),
    Admin,
}

impl Principal {
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn user(self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(user),
            Self::Admin => None,
        }
    }
}

/// Session persistence payload.
#[derive(Debug, Clone)]
pub(crate) struct NewSession {
    pub uuid: Uuid,
    pub token_hash: String,
    pub principal: Principal,
    pub expires_at: Timestamp,
}

/// Session issuance result with the one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub principal: Principal,
    pub expires_at: Timestamp,
}
