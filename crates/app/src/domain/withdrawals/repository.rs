//! Withdrawals Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{decode_amount, decode_error, encode_amount, parse_column},
    domain::{
        users::records::UserUuid,
        withdrawals::{
            records::{
                WithdrawalHistoryEntry, WithdrawalHistoryUuid, WithdrawalRecord, WithdrawalUuid,
            },
            state::{WithdrawalState, WithdrawalStatus},
        },
    },
};

const CREATE_WITHDRAWAL_SQL: &str = include_str!("sql/create_withdrawal.sql");
const GET_WITHDRAWAL_SQL: &str = include_str!("sql/get_withdrawal.sql");
const LIST_WITHDRAWALS_SQL: &str = include_str!("sql/list_withdrawals.sql");
const DECIDE_WITHDRAWAL_SQL: &str = include_str!("sql/decide_withdrawal.sql");
const INSERT_WITHDRAWAL_HISTORY_SQL: &str = include_str!("sql/insert_withdrawal_history.sql");
const LIST_WITHDRAWAL_HISTORY_SQL: &str = include_str!("sql/list_withdrawal_history.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgWithdrawalsRepository;

impl PgWithdrawalsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_withdrawal(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        withdrawal: WithdrawalUuid,
        user: UserUuid,
        amount: u64,
    ) -> Result<WithdrawalRecord, sqlx::Error> {
        query(CREATE_WITHDRAWAL_SQL)
            .bind(withdrawal.into_uuid())
            .bind(user.into_uuid())
            .bind(encode_amount(amount, "amount")?)
            .execute(&mut **tx)
            .await?;

        self.get_withdrawal(tx, withdrawal).await
    }

    pub(crate) async fn get_withdrawal(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        withdrawal: WithdrawalUuid,
    ) -> Result<WithdrawalRecord, sqlx::Error> {
        query_as::<Postgres, WithdrawalRecord>(GET_WITHDRAWAL_SQL)
            .bind(withdrawal.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Requests, newest first, optionally narrowed to one user or one status.
    pub(crate) async fn list_withdrawals(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: Option<UserUuid>,
        status: Option<WithdrawalStatus>,
    ) -> Result<Vec<WithdrawalRecord>, sqlx::Error> {
        query_as::<Postgres, WithdrawalRecord>(LIST_WITHDRAWALS_SQL)
            .bind(user.map(UserUuid::into_uuid))
            .bind(status.map(WithdrawalStatus::as_str))
            .fetch_all(&mut **tx)
            .await
    }

    /// Move a pending request to `state`. Returns zero when it was no longer pending.
    pub(crate) async fn decide_withdrawal(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        withdrawal: WithdrawalUuid,
        state: WithdrawalState,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DECIDE_WITHDRAWAL_SQL)
            .bind(withdrawal.into_uuid())
            .bind(state.status().as_str())
            .bind(state.processed_at().map(SqlxTimestamp::from))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn insert_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        entry: &WithdrawalHistoryEntry,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_WITHDRAWAL_HISTORY_SQL)
            .bind(entry.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(entry.request_uuid.into_uuid())
            .bind(encode_amount(entry.amount, "amount")?)
            .bind(SqlxTimestamp::from(entry.processed_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn list_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<WithdrawalHistoryEntry>, sqlx::Error> {
        query_as::<Postgres, WithdrawalHistoryEntry>(LIST_WITHDRAWAL_HISTORY_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

fn state_from_row(row: &PgRow) -> sqlx::Result<WithdrawalState> {
    let status: WithdrawalStatus = parse_column(row, "status")?;
    let processed_at = row
        .try_get::<Option<SqlxTimestamp>, _>("processed_at")?
        .map(SqlxTimestamp::to_jiff);

    match (status, processed_at) {
        (WithdrawalStatus::Pending, None) => Ok(WithdrawalState::Pending),
        (WithdrawalStatus::Approved, Some(processed_at)) => {
            Ok(WithdrawalState::Approved { processed_at })
        }
        (WithdrawalStatus::Rejected, Some(processed_at)) => {
            Ok(WithdrawalState::Rejected { processed_at })
        }
        _ => Err(decode_error(
            "processed_at",
            format!("processing time does not match status {status}"),
        )),
    }
}

impl<'r> FromRow<'r, PgRow> for WithdrawalRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: WithdrawalUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            user_name: row.try_get("user_name")?,
            user_code: row.try_get("user_code")?,
            amount: decode_amount(row.try_get("amount")?, "amount")?,
            state: state_from_row(row)?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for WithdrawalHistoryEntry {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: WithdrawalHistoryUuid::from_uuid(row.try_get("uuid")?),
            request_uuid: WithdrawalUuid::from_uuid(row.try_get("request_uuid")?),
            amount: decode_amount(row.try_get("amount")?, "amount")?,
            processed_at: row.try_get::<SqlxTimestamp, _>("processed_at")?.to_jiff(),
        })
    }
}
