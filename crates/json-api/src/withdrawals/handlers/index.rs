//! Own Withdrawals Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    withdrawals::{errors::into_status_error, models::WithdrawalsResponse},
};

/// Own Withdrawals Handler
///
/// Lists the signed-in user's withdrawal requests.
#[endpoint(
    tags("withdrawals"),
    summary = "List Own Withdrawals",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<WithdrawalsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let withdrawals = state
        .app
        .withdrawals
        .list_for_user(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(withdrawals.into()))
}
