//! Withdrawal Index Handler

use std::sync::Arc;

use salvo::{oapi::extract::QueryParam, prelude::*};

use qrewards_app::domain::withdrawals::state::WithdrawalStatus;

use crate::{
    extensions::*,
    state::State,
    withdrawals::{errors::into_status_error, models::WithdrawalsResponse},
};

/// Withdrawal Index Handler
///
/// Lists every withdrawal request, optionally filtered by status.
#[endpoint(
    tags("admin"),
    summary = "List Withdrawals",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(
    status: QueryParam<String, false>,
    depot: &mut Depot,
) -> Result<Json<WithdrawalsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let status = status
        .into_inner()
        .map(|status| status.parse::<WithdrawalStatus>())
        .transpose()
        .or_400("could not parse \"status\" query parameter")?;

    let withdrawals = state
        .app
        .withdrawals
        .list(status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(withdrawals.into()))
}
