//! Dashboard Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::decode_amount,
    domain::dashboard::records::{DashboardSummary, ProductCounts},
};

const SUMMARY_SQL: &str = include_str!("sql/summary.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDashboardRepository;

impl PgDashboardRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<DashboardSummary, sqlx::Error> {
        query_as::<Postgres, DashboardSummary>(SUMMARY_SQL)
            .fetch_one(&mut **tx)
            .await
    }
}

fn count(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    decode_amount(row.try_get(column)?, column)
}

impl<'r> FromRow<'r, PgRow> for DashboardSummary {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            users: count(row, "users")?,
            products: ProductCounts {
                active: count(row, "active_products")?,
                scanned: count(row, "scanned_products")?,
                disabled: count(row, "disabled_products")?,
            },
            pending_kyc: count(row, "pending_kyc")?,
            pending_withdrawals: count(row, "pending_withdrawals")?,
            coins_outstanding: count(row, "coins_outstanding")?,
        })
    }
}
