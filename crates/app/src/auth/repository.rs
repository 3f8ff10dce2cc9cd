//! Sessions repository.

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::models::{NewSession, Principal},
    domain::users::records::UserUuid,
};

const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const FIND_ACTIVE_SESSION_SQL: &str = include_str!("sql/find_active_session.sql");
const REVOKE_SESSION_SQL: &str = include_str!("sql/revoke_session.sql");

#[derive(Debug, Clone)]
pub(crate) struct PgSessionsRepository {
    pool: PgPool,
}

impl PgSessionsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_session(&self, session: &NewSession) -> Result<(), sqlx::Error> {
        query(CREATE_SESSION_SQL)
            .bind(session.uuid)
            .bind(&session.token_hash)
            .bind(session.principal.kind())
            .bind(session.principal.user().map(UserUuid::into_uuid))
            .bind(SqlxTimestamp::from(session.expires_at))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub(crate) async fn find_active_session(
        &self,
        session: Uuid,
        token_hash: &str,
    ) -> Result<Option<Principal>, sqlx::Error> {
        query_as::<Postgres, SessionPrincipal>(FIND_ACTIVE_SESSION_SQL)
            .bind(session)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(|row| row.0))
    }

    pub(crate) async fn revoke_session(
        &self,
        session: Uuid,
        token_hash: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(REVOKE_SESSION_SQL)
            .bind(session)
            .bind(token_hash)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

struct SessionPrincipal(Principal);

impl<'r> FromRow<'r, PgRow> for SessionPrincipal {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let principal: &str = row.try_get("principal")?;
        let user: Option<Uuid> = row.try_get("user_uuid")?;

        match (principal, user) {
            ("user", Some(user)) => Ok(Self(Principal::User(UserUuid::from_uuid(user)))),
            ("admin", None) => Ok(Self(Principal::Admin)),
            _ => Err(sqlx::Error::ColumnDecode {
                index: "principal".to_string(),
                source: format!("inconsistent session principal {principal:?}").into(),
            }),
        }
    }
}
