//! Session response bodies

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};

use qrewards_app::auth::IssuedSession;

use crate::users::models::UserResponse;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,

    /// `user` or `admin`
    pub role: String,

    pub expires_at: String,

    /// The signed-in account; absent for administrator sessions
    pub user: Option<UserResponse>,
}

impl SessionResponse {
    pub(crate) fn new(session: IssuedSession, user: Option<UserResponse>) -> Self {
        Self {
            token: session.token,
            role: session.principal.kind().to_string(),
            expires_at: session.expires_at.to_string(),
            user,
        }
    }
}
