//! Products Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    database::{decode_amount, decode_error, encode_amount, parse_column},
    domain::{
        categories::records::CategoryUuid,
        products::{
            data::ProductFilter,
            records::{ProductRecord, ProductUuid},
            state::{QrState, QrStatus},
        },
        users::records::UserUuid,
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const LOCK_PRODUCT_SQL: &str = include_str!("sql/lock_product.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const MARK_SCANNED_SQL: &str = include_str!("sql/mark_scanned.sql");
const SET_QR_STATUS_SQL: &str = include_str!("sql/set_qr_status.sql");

/// Insert payload for a product whose media is already stored.
#[derive(Debug, Clone)]
pub(crate) struct NewProductRow<'a> {
    pub uuid: ProductUuid,
    pub product_code: &'a str,
    pub name: &'a str,
    pub category: Option<CategoryUuid>,
    pub coin_reward: u64,
    pub image_url: Option<&'a str>,
    pub qr_image_url: &'a str,
    pub qr_payload: &'a str,
}

/// Editable columns of a product.
#[derive(Debug, Clone)]
pub(crate) struct ProductRow<'a> {
    pub name: &'a str,
    pub category: Option<CategoryUuid>,
    pub coin_reward: u64,
    pub image_url: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(filter.status.map(QrStatus::as_str))
            .bind(filter.category.map(CategoryUuid::into_uuid))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_code: &str,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product_code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_code: &str,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product_code)
            .fetch_one(&mut **tx)
            .await
    }

    /// Load a product and hold its row lock until the transaction ends.
    pub(crate) async fn lock_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_code: &str,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LOCK_PRODUCT_SQL)
            .bind(product_code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProductRow<'_>,
    ) -> Result<ProductRecord, sqlx::Error> {
        query(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.product_code)
            .bind(product.name)
            .bind(product.category.map(CategoryUuid::into_uuid))
            .bind(encode_amount(product.coin_reward, "coin_reward")?)
            .bind(product.image_url)
            .bind(product.qr_image_url)
            .bind(product.qr_payload)
            .execute(&mut **tx)
            .await?;

        self.get_product(tx, product.product_code).await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_code: &str,
        product: &ProductRow<'_>,
    ) -> Result<ProductRecord, sqlx::Error> {
        query(UPDATE_PRODUCT_SQL)
            .bind(product_code)
            .bind(product.name)
            .bind(product.category.map(CategoryUuid::into_uuid))
            .bind(encode_amount(product.coin_reward, "coin_reward")?)
            .bind(product.image_url)
            .execute(&mut **tx)
            .await?;

        self.get_product(tx, product_code).await
    }

    /// Delete a product, returning its image and QR image URLs if it existed.
    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_code: &str,
    ) -> Result<Option<(Option<String>, String)>, sqlx::Error> {
        query_as(DELETE_PRODUCT_SQL)
            .bind(product_code)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Consume an active code. Returns the number of rows changed: zero means the
    /// code was no longer active.
    pub(crate) async fn mark_scanned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_code: &str,
        by: UserUuid,
        at: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_SCANNED_SQL)
            .bind(product_code)
            .bind(by.into_uuid())
            .bind(SqlxTimestamp::from(at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Set the status of a code that has not been scanned.
    pub(crate) async fn set_qr_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_code: &str,
        status: QrStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(SET_QR_STATUS_SQL)
            .bind(product_code)
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

fn qr_from_row(row: &PgRow) -> sqlx::Result<QrState> {
    let status: QrStatus = parse_column(row, "qr_status")?;
    let scanned_by: Option<Uuid> = row.try_get("scanned_by")?;
    let scanned_at = row
        .try_get::<Option<SqlxTimestamp>, _>("scanned_at")?
        .map(SqlxTimestamp::to_jiff);

    match (status, scanned_by, scanned_at) {
        (QrStatus::Active, None, None) => Ok(QrState::Active),
        (QrStatus::Disabled, None, None) => Ok(QrState::Disabled),
        (QrStatus::Scanned, Some(by), Some(at)) => Ok(QrState::Scanned {
            by: UserUuid::from_uuid(by),
            at,
        }),
        _ => Err(decode_error(
            "qr_status",
            format!("scan details do not match status {status}"),
        )),
    }
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            product_code: row.try_get("product_code")?,
            name: row.try_get("name")?,
            category_uuid: row
                .try_get::<Option<Uuid>, _>("category_uuid")?
                .map(CategoryUuid::from_uuid),
            category_name: row.try_get("category_name")?,
            coin_reward: decode_amount(row.try_get("coin_reward")?, "coin_reward")?,
            image_url: row.try_get("image_url")?,
            qr_image_url: row.try_get("qr_image_url")?,
            qr_payload: row.try_get("qr_payload")?,
            qr: qr_from_row(row)?,
            redeemed_by_name: row.try_get("redeemed_by_name")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
