//! Reward History Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::RewardResponse},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RewardsResponse {
    /// Redemptions, newest first
    pub rewards: Vec<RewardResponse>,
}

/// Reward History Handler
///
/// Lists the products the signed-in user has redeemed.
#[endpoint(
    tags("me"),
    summary = "Reward History",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<RewardsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_403()?;

    let rewards = state
        .app
        .users
        .reward_history(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(RewardsResponse {
        rewards: rewards.into_iter().map(Into::into).collect(),
    }))
}
