//! Prometheus metrics and the `/metrics` endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use tracing::error;

const DURATION_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug)]
struct Metrics {
    registry: Registry,
    http_requests: IntCounterVec,
    http_duration: HistogramVec,
    http_in_flight: IntGauge,
    scan_outcomes: IntCounterVec,
}

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

fn metrics() -> Option<&'static Metrics> {
    METRICS
        .get_or_init(|| match Metrics::build() {
            Ok(metrics) => Some(metrics),
            Err(source) => {
                error!("failed to build metrics registry: {source}");

                None
            }
        })
        .as_ref()
}

impl Metrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests = register(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "qrewards_http_requests_total",
                    "HTTP requests by method, route and status.",
                ),
                &["method", "route", "status_class", "status_code"],
            )?,
        )?;

        let http_duration = register(
            &registry,
            HistogramVec::new(
                HistogramOpts::new(
                    "qrewards_http_request_duration_seconds",
                    "HTTP request duration by method and route.",
                )
                .buckets(DURATION_BUCKETS.to_vec()),
                &["method", "route"],
            )?,
        )?;

        let http_in_flight = register(
            &registry,
            IntGauge::new(
                "qrewards_http_requests_in_flight",
                "HTTP requests currently being served.",
            )?,
        )?;

        let scan_outcomes = register(
            &registry,
            IntCounterVec::new(
                Opts::new(
                    "qrewards_qr_scans_total",
                    "QR scan attempts by outcome.",
                ),
                &["outcome"],
            )?,
        )?;

        Ok(Self {
            registry,
            http_requests,
            http_duration,
            http_in_flight,
            scan_outcomes,
        })
    }
}

fn register<M>(registry: &Registry, metric: M) -> Result<M, prometheus::Error>
where
    M: Collector + Clone + 'static,
{
    registry.register(Box::new(metric.clone()))?;

    Ok(metric)
}

/// Counts a request as in flight until dropped.
#[derive(Debug)]
pub(super) struct InFlight(());

impl InFlight {
    pub(super) fn start() -> Self {
        if let Some(metrics) = metrics() {
            metrics.http_in_flight.inc();
        }

        Self(())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Some(metrics) = metrics() {
            metrics.http_in_flight.dec();
        }
    }
}

pub(super) fn observe_request(method: &str, route: &str, status: StatusCode, seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    };

    metrics
        .http_requests
        .with_label_values(&[method, route, status_class, status.as_str()])
        .inc();

    metrics
        .http_duration
        .with_label_values(&[method, route])
        .observe(seconds);
}

/// Count one QR scan by its outcome (`redeemed`, `already_used`, or a refusal).
pub(crate) fn record_scan_outcome(outcome: &str) {
    if let Some(metrics) = metrics() {
        metrics.scan_outcomes.with_label_values(&[outcome]).inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    };

    let encoder = TextEncoder::new();
    let mut body = Vec::new();

    if let Err(source) = encoder.encode(&metrics.registry.gather(), &mut body) {
        error!("failed to encode metrics: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    match HeaderValue::from_str(encoder.format_type()) {
        Ok(content_type) => {
            res.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        Err(source) => {
            error!("failed to encode metrics content type: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    }

    res.render(String::from_utf8_lossy(&body).into_owned());
}

#[cfg(test)]
mod tests {
    use salvo::{
        Router, Service,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn metrics_endpoint_exposes_http_and_scan_metrics() -> TestResult {
        observe_request("POST", "/scans", StatusCode::OK, 0.042);
        observe_request("POST", "/scans", StatusCode::CONFLICT, 0.013);
        record_scan_outcome("redeemed");

        {
            let _in_flight = InFlight::start();
        }

        let service =
            Service::new(Router::new().push(Router::with_path("metrics").get(metrics_handler)));

        let body = TestClient::get("http://example.com/metrics")
            .send(&service)
            .await
            .take_string()
            .await?;

        for name in [
            "qrewards_http_requests_total",
            "qrewards_http_request_duration_seconds",
            "qrewards_http_requests_in_flight",
            "qrewards_qr_scans_total",
        ] {
            assert!(body.contains(name), "expected {name} in metrics output");
        }

        assert!(
            body.contains(r#"status_class="4xx""#),
            "expected the conflict to be classed as 4xx"
        );

        Ok(())
    }
}
