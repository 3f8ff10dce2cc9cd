//! Healthcheck Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, state::State};

/// Healthcheck response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthResponse {
    /// Service status
    pub status: String,

    /// Seconds since the server started
    pub uptime_seconds: i64,
}

/// Healthcheck handler
///
/// Returns service health status
#[endpoint(tags("health"), summary = "Health check endpoint")]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<HealthResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let uptime = Timestamp::now().duration_since(state.started_at);

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: uptime.as_secs().max(0),
    }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::test_helpers::{Mocks, public_service};

    use super::*;

    #[tokio::test]
    async fn test_healthcheck() -> TestResult {
        let service = public_service(
            Mocks::new(),
            Router::with_path("healthcheck").get(handler),
        );

        let response: HealthResponse = TestClient::get("http://example.com/healthcheck")
            .send(&service)
            .await
            .take_json()
            .await?;

        assert_eq!(response.status, "ok");
        assert!(response.uptime_seconds >= 0, "uptime cannot be negative");

        Ok(())
    }
}
