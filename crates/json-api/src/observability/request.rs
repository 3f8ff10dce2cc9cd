//! Per-request span, request id, completion log and HTTP metrics.

use std::time::{Duration, Instant};

use salvo::{
    Request, handler,
    http::{StatusCode, header::HeaderValue},
    prelude::{Depot, FlowCtrl, Response},
};
use tracing::{Instrument as _, error, info, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;
use uuid::Uuid;

use crate::config::observability::ObservabilityConfig;

use super::{metrics, otel};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request middleware. Reuses a caller's `x-request-id` or assigns one.
#[derive(Debug, Clone)]
pub(crate) struct RequestLogging {
    slow_request_threshold: Duration,
    accept_remote_parent: bool,
}

impl RequestLogging {
    pub(crate) fn new(config: &ObservabilityConfig) -> Self {
        Self {
            slow_request_threshold: Duration::from_millis(config.slow_request_threshold_ms),
            accept_remote_parent: config.otel_enabled && config.otel_parent_propagation_enabled,
        }
    }
}

#[handler]
impl RequestLogging {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        if req.uri().path() == "/metrics" {
            ctrl.call_next(req, depot, res).await;

            return;
        }

        let started = Instant::now();
        let _in_flight = metrics::InFlight::start();

        let request_id = req
            .header::<String>(REQUEST_ID_HEADER)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        match HeaderValue::from_str(&request_id) {
            Ok(value) => {
                res.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            Err(source) => warn!("could not echo request id header: {source}"),
        }

        let method = req.method().to_string();
        let path = req.uri().path().to_owned();
        let route = route_label(&path);

        let span = tracing::info_span!(
            parent: None,
            "http.request",
            otel.name = %format!("{method} {route}"),
            otel.kind = "server",
            request_id = %request_id,
            method = %method,
            route = %route,
            remote_addr = %req.remote_addr(),
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        if self.accept_remote_parent
            && let Some(parent) = otel::remote_parent(req.headers())
            && let Err(source) = span.set_parent(parent)
        {
            warn!("failed to set remote parent on request span: {source}");
        }

        ctrl.call_next(req, depot, res)
            .instrument(span.clone())
            .await;

        let elapsed = started.elapsed();
        let status = res.status_code.unwrap_or(StatusCode::OK);
        let duration_ms = elapsed.as_millis();

        metrics::observe_request(&method, &route, status, elapsed.as_secs_f64());

        span.record("status", status.as_u16());
        span.record("duration_ms", duration_ms);

        span.in_scope(|| {
            info!(status = status.as_u16(), duration_ms, "request completed");

            if status.is_server_error() {
                error!(status = status.as_u16(), path = %path, "server error response");
            } else if status.is_client_error() {
                warn!(status = status.as_u16(), path = %path, "client error response");
            }

            if elapsed > self.slow_request_threshold {
                warn!(
                    path = %path,
                    duration_ms,
                    threshold_ms = self.slow_request_threshold.as_millis(),
                    "slow request"
                );
            }
        });
    }
}

/// Collapse identifiers in `path` so metric labels and span names stay bounded.
fn route_label(path: &str) -> String {
    let mut label = String::new();
    let mut previous = "";

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        label.push('/');

        if segment == "media" && label == "/" {
            label.push_str("media/{file}");
            break;
        }

        if Uuid::parse_str(segment).is_ok() {
            label.push_str("{uuid}");
        } else if previous == "products" {
            label.push_str("{code}");
        } else {
            label.push_str(segment);
        }

        previous = segment;
    }

    if label.is_empty() {
        label.push('/');
    }

    label
}
