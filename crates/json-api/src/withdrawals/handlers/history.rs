//! Withdrawal History Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    state::State,
    withdrawals::{errors::into_status_error, models::WithdrawalHistoryResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct HistoryResponse {
    /// Paid-out withdrawals, newest first
    pub history: Vec<WithdrawalHistoryResponse>,
}

/// Withdrawal History Handler
#[endpoint(
    tags("withdrawals"),
    summary = "Withdrawal History",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<HistoryResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let entries = state
        .app
        .withdrawals
        .history(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(HistoryResponse {
        history: entries.into_iter().map(Into::into).collect(),
    }))
}
