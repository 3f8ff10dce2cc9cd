//! Users Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, PgPool, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar,
};
use uuid::Uuid;

use crate::{
    database::{decode_amount, decode_error, encode_amount, parse_column},
    domain::{
        kyc::state::{KycState, KycStatus},
        users::records::{
            DocumentRecord, Documents, Profile, RewardEntry, RewardEntryUuid, UserRecord, UserUuid,
        },
    },
};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const LOCK_USER_SQL: &str = include_str!("sql/lock_user.sql");
const LIST_USERS_BY_KYC_STATUS_SQL: &str = include_str!("sql/list_users_by_kyc_status.sql");
const USER_EXISTS_SQL: &str = include_str!("sql/user_exists.sql");
const SAVE_USER_SQL: &str = include_str!("sql/save_user.sql");
const SAVE_DOCUMENTS_SQL: &str = include_str!("sql/save_documents.sql");
const FIND_CREDENTIALS_SQL: &str = include_str!("sql/find_credentials.sql");
const HAS_REDEEMED_SQL: &str = include_str!("sql/has_redeemed.sql");
const INSERT_REWARD_ENTRY_SQL: &str = include_str!("sql/insert_reward_entry.sql");
const LIST_REWARD_HISTORY_SQL: &str = include_str!("sql/list_reward_history.sql");
const CREDIT_COINS_SQL: &str = include_str!("sql/credit_coins.sql");
const DEBIT_COINS_SQL: &str = include_str!("sql/debit_coins.sql");
const SCHEDULE_DELETION_SQL: &str = include_str!("sql/schedule_deletion.sql");
const CANCEL_DELETION_SQL: &str = include_str!("sql/cancel_deletion.sql");
const SWEEP_DELETIONS_SQL: &str = include_str!("sql/sweep_deletions.sql");

/// Login lookup result.
#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub uuid: UserUuid,
    pub password_hash: String,
    pub deletion_scheduled_at: Option<Timestamp>,
}

/// Signup insert payload; fields are already normalized.
#[derive(Debug, Clone)]
pub(crate) struct NewUserRow<'a> {
    pub uuid: UserUuid,
    pub user_code: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub password_hash: &'a str,
}

/// Account removed by a deletion sweep, with one of its stored document images.
#[derive(Debug, Clone)]
pub(crate) struct SweptDocument {
    pub user: UserUuid,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a user and its empty document slots in one statement.
    pub(crate) async fn create_user(
        &self,
        pool: &PgPool,
        user: &NewUserRow<'_>,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(user.user_code)
            .bind(user.name)
            .bind(user.email)
            .bind(user.phone)
            .bind(user.password_hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Load a user and hold its row lock until the transaction ends.
    pub(crate) async fn lock_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(LOCK_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_users_by_kyc_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        status: KycStatus,
    ) -> Result<Vec<UserRecord>, sqlx::Error> {
        query_as::<Postgres, UserRecord>(LIST_USERS_BY_KYC_STATUS_SQL)
            .bind(status.as_str())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn user_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(USER_EXISTS_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Persist the editable profile, the KYC state and every document slot.
    ///
    /// The coin balance is never written here; it only moves through
    /// [`Self::credit_coins`] and [`Self::debit_coins`].
    pub(crate) async fn save_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &UserRecord,
    ) -> Result<(), sqlx::Error> {
        let profile = &user.profile;

        query(SAVE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.name)
            .bind(&profile.date_of_birth)
            .bind(&profile.address_line)
            .bind(&profile.city)
            .bind(&profile.state)
            .bind(&profile.pin_code)
            .bind(&profile.account_holder_name)
            .bind(&profile.account_number)
            .bind(&profile.ifsc_code)
            .bind(&profile.bank_name)
            .bind(&profile.pan_number)
            .bind(&profile.aadhar_number)
            .bind(user.is_profile_complete)
            .bind(user.kyc.status().as_str())
            .bind(user.kyc.requested_at().map(SqlxTimestamp::from))
            .bind(user.kyc.approved_at().map(SqlxTimestamp::from))
            .bind(user.kyc.rejection_reason())
            .execute(&mut **tx)
            .await?;

        let mut types = Vec::with_capacity(3);
        let mut image_urls = Vec::with_capacity(3);
        let mut statuses = Vec::with_capacity(3);
        let mut reasons = Vec::with_capacity(3);

        for (kind, document) in user.documents.iter() {
            types.push(kind.as_str());
            image_urls.push(document.image_url.clone());
            statuses.push(document.status.as_str());
            reasons.push(document.rejection_reason.clone());
        }

        query(SAVE_DOCUMENTS_SQL)
            .bind(user.uuid.into_uuid())
            .bind(types)
            .bind(image_urls)
            .bind(statuses)
            .bind(reasons)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn find_credentials(
        &self,
        pool: &PgPool,
        login: &str,
    ) -> Result<Option<UserCredentials>, sqlx::Error> {
        let row: Option<(Uuid, String, Option<SqlxTimestamp>)> = query_as(FIND_CREDENTIALS_SQL)
            .bind(login)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(|(uuid, password_hash, deletion_scheduled_at)| UserCredentials {
            uuid: UserUuid::from_uuid(uuid),
            password_hash,
            deletion_scheduled_at: deletion_scheduled_at.map(SqlxTimestamp::to_jiff),
        }))
    }

    pub(crate) async fn has_redeemed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        product_code: &str,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(HAS_REDEEMED_SQL)
            .bind(user.into_uuid())
            .bind(product_code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn insert_reward_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        entry: &RewardEntry,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_REWARD_ENTRY_SQL)
            .bind(entry.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(&entry.product_code)
            .bind(&entry.product_name)
            .bind(&entry.category_name)
            .bind(encode_amount(entry.coins_earned, "coins_earned")?)
            .bind(SqlxTimestamp::from(entry.redeemed_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn list_reward_history(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<RewardEntry>, sqlx::Error> {
        query_as::<Postgres, RewardEntry>(LIST_REWARD_HISTORY_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Add `amount` to the balance, returning the new balance.
    pub(crate) async fn credit_coins(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        amount: u64,
    ) -> Result<u64, sqlx::Error> {
        let balance: i64 = query_scalar(CREDIT_COINS_SQL)
            .bind(user.into_uuid())
            .bind(encode_amount(amount, "coins_earned")?)
            .fetch_one(&mut **tx)
            .await?;

        decode_amount(balance, "coins_earned")
    }

    /// Subtract `amount` if the balance covers it, returning the new balance.
    pub(crate) async fn debit_coins(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        amount: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let balance: Option<i64> = query_scalar(DEBIT_COINS_SQL)
            .bind(user.into_uuid())
            .bind(encode_amount(amount, "coins_earned")?)
            .fetch_optional(&mut **tx)
            .await?;

        balance
            .map(|balance| decode_amount(balance, "coins_earned"))
            .transpose()
    }

    pub(crate) async fn schedule_deletion(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SCHEDULE_DELETION_SQL)
            .bind(user.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Clear a pending deletion. Returns whether one was pending.
    pub(crate) async fn cancel_deletion(
        &self,
        pool: &PgPool,
        user: UserUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(CANCEL_DELETION_SQL)
            .bind(user.into_uuid())
            .execute(pool)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Delete every account whose grace period ended at or before `now`.
    pub(crate) async fn sweep_deletions(
        &self,
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<SweptDocument>, sqlx::Error> {
        let rows: Vec<(Uuid, Option<String>)> = query_as(SWEEP_DELETIONS_SQL)
            .bind(SqlxTimestamp::from(now))
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user, image_url)| SweptDocument {
                user: UserUuid::from_uuid(user),
                image_url,
            })
            .collect())
    }
}

fn document_from_row(row: &PgRow, prefix: &str) -> sqlx::Result<DocumentRecord> {
    Ok(DocumentRecord {
        image_url: row.try_get(format!("{prefix}_image_url").as_str())?,
        status: parse_column(row, &format!("{prefix}_status"))?,
        rejection_reason: row.try_get(format!("{prefix}_rejection_reason").as_str())?,
    })
}

fn kyc_from_row(row: &PgRow) -> sqlx::Result<KycState> {
    let status: KycStatus = parse_column(row, "kyc_status")?;

    let requested_at = row
        .try_get::<Option<SqlxTimestamp>, _>("kyc_requested_at")?
        .map(SqlxTimestamp::to_jiff);

    let approved_at = row
        .try_get::<Option<SqlxTimestamp>, _>("kyc_approved_at")?
        .map(SqlxTimestamp::to_jiff);

    let reason: Option<String> = row.try_get("kyc_rejection_reason")?;

    Ok(match status {
        KycStatus::Incomplete => KycState::Incomplete,
        KycStatus::Pending => KycState::Pending {
            requested_at: requested_at.ok_or_else(|| {
                decode_error("kyc_requested_at", "pending review has no request time")
            })?,
        },
        KycStatus::Approved => KycState::Approved {
            requested_at,
            approved_at: approved_at.ok_or_else(|| {
                decode_error("kyc_approved_at", "approved review has no approval time")
            })?,
        },
        KycStatus::Rejected => KycState::Rejected {
            requested_at,
            reason: reason.ok_or_else(|| {
                decode_error("kyc_rejection_reason", "rejected review has no reason")
            })?,
        },
    })
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            user_code: row.try_get("user_code")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            coins_earned: decode_amount(row.try_get("coins_earned")?, "coins_earned")?,
            profile: Profile {
                date_of_birth: row.try_get("date_of_birth")?,
                address_line: row.try_get("address_line")?,
                city: row.try_get("city")?,
                state: row.try_get("state")?,
                pin_code: row.try_get("pin_code")?,
                account_holder_name: row.try_get("account_holder_name")?,
                account_number: row.try_get("account_number")?,
                ifsc_code: row.try_get("ifsc_code")?,
                bank_name: row.try_get("bank_name")?,
                pan_number: row.try_get("pan_number")?,
                aadhar_number: row.try_get("aadhar_number")?,
            },
            documents: Documents {
                pan: document_from_row(row, "pan")?,
                aadhar: document_from_row(row, "aadhar")?,
                passbook: document_from_row(row, "passbook")?,
            },
            kyc: kyc_from_row(row)?,
            is_profile_complete: row.try_get("is_profile_complete")?,
            deletion_scheduled_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deletion_scheduled_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for RewardEntry {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: RewardEntryUuid::from_uuid(row.try_get("uuid")?),
            product_code: row.try_get("product_code")?,
            product_name: row.try_get("product_name")?,
            category_name: row.try_get("category_name")?,
            coins_earned: decode_amount(row.try_get("coins_earned")?, "coins_earned")?,
            redeemed_at: row.try_get::<SqlxTimestamp, _>("redeemed_at")?.to_jiff(),
        })
    }
}
