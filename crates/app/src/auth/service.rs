//! Auth service.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use async_trait::async_trait;
use jiff::SignedDuration;
use mockall::automock;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{
        AuthServiceError, IssuedSession, NewSession, Principal, SessionTokenVersion,
        format_session_token, generate_session_secret, hash_session_token, parse_session_token,
        repository::PgSessionsRepository, verify_password,
    },
    config::{AppConfig, Secret},
    database::{Db, db_now},
    domain::users::repository::PgUsersRepository,
};

#[derive(Clone)]
pub struct PgAuthService {
    db: Db,
    sessions: PgSessionsRepository,
    users: PgUsersRepository,
    admin_email: String,
    admin_password: Secret,
    session_ttl: SignedDuration,
}

impl Debug for PgAuthService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PgAuthService")
            .field("db", &self.db)
            .field("admin_email", &self.admin_email)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db, config: &AppConfig) -> Self {
        Self {
            sessions: PgSessionsRepository::new(db.pool().clone()),
            users: PgUsersRepository::new(),
            db,
            admin_email: config.admin_email.trim().to_lowercase(),
            admin_password: config.admin_password.clone(),
            session_ttl: config.session_ttl,
        }
    }

    fn is_admin(&self, email: &str, password: &str) -> bool {
        let email_matches = email.trim().eq_ignore_ascii_case(&self.admin_email);

        let password_matches = Sha256::digest(password.as_bytes())
            == Sha256::digest(self.admin_password.expose().as_bytes());

        email_matches && password_matches
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let parsed =
            parse_session_token(bearer_token).map_err(|_source| AuthServiceError::NotFound)?;

        self.sessions
            .find_active_session(parsed.session_uuid, &parsed.hash())
            .await?
            .ok_or(AuthServiceError::NotFound)
    }

    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthServiceError> {
        let identifier = identifier.trim();

        let login = if identifier.contains('@') {
            identifier.to_lowercase()
        } else {
            identifier.to_string()
        };

        let Some(credentials) = self.users.find_credentials(self.db.pool(), &login).await? else {
            return Err(AuthServiceError::InvalidCredentials);
        };

        if !verify_password(password, &credentials.password_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        if credentials.deletion_scheduled_at.is_some()
            && self
                .users
                .cancel_deletion(self.db.pool(), credentials.uuid)
                .await?
        {
            info!(user = %credentials.uuid, "account deletion cancelled by login");
        }

        self.start_session(Principal::User(credentials.uuid)).await
    }

    async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthServiceError> {
        if !self.is_admin(email, password) {
            warn!("rejected admin login");

            return Err(AuthServiceError::InvalidCredentials);
        }

        self.start_session(Principal::Admin).await
    }

    async fn start_session(&self, principal: Principal) -> Result<IssuedSession, AuthServiceError> {
        let session_uuid = Uuid::now_v7();
        let version = SessionTokenVersion::V1;
        let secret = generate_session_secret();
        let expires_at = db_now().checked_add(self.session_ttl)?;

        self.sessions
            .create_session(&NewSession {
                uuid: session_uuid,
                token_hash: hash_session_token(session_uuid, version, &secret),
                principal,
                expires_at,
            })
            .await?;

        info!(session = %session_uuid, principal = principal.kind(), "session started");

        Ok(IssuedSession {
            token: format_session_token(session_uuid, version, &secret),
            principal,
            expires_at,
        })
    }

    async fn logout(&self, bearer_token: &str) -> Result<(), AuthServiceError> {
        let parsed =
            parse_session_token(bearer_token).map_err(|_source| AuthServiceError::NotFound)?;

        if self
            .sessions
            .revoke_session(parsed.session_uuid, &parsed.hash())
            .await?
            == 0
        {
            return Err(AuthServiceError::NotFound);
        }

        info!(session = %parsed.session_uuid, "session revoked");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the principal of its live session.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;

    /// Log a user in by email or phone. A pending account deletion is cancelled.
    async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthServiceError>;

    /// Log the configured administrator in.
    async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IssuedSession, AuthServiceError>;

    /// Issue a session token for `principal`.
    async fn start_session(&self, principal: Principal) -> Result<IssuedSession, AuthServiceError>;

    /// Revoke the session behind `bearer_token`.
    async fn logout(&self, bearer_token: &str) -> Result<(), AuthServiceError>;
}
