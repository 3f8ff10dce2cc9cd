//! Telemetry lifecycle.

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::SdkTracerProvider};
use tracing::error;

use crate::config::observability::{LoggingConfig, ObservabilityConfig};

use super::{ObservabilityError, logging, otel};

/// Installed telemetry pipelines. Call [`Observability::shutdown`] before exit
/// so buffered spans are flushed.
#[derive(Debug)]
pub(crate) struct Observability {
    tracer_provider: Option<SdkTracerProvider>,
}

impl Observability {
    pub(crate) fn init(
        logging: &LoggingConfig,
        observability: &ObservabilityConfig,
    ) -> Result<Self, ObservabilityError> {
        let tracer_provider = if observability.otel_enabled {
            global::set_text_map_propagator(TraceContextPropagator::new());

            Some(otel::build_tracer_provider(observability)?)
        } else {
            None
        };

        let export = tracer_provider
            .as_ref()
            .map(|provider| otel::export_layer(provider, observability));

        logging::init_subscriber(logging, export)?;

        Ok(Self { tracer_provider })
    }

    pub(crate) fn shutdown(self) {
        let Some(provider) = self.tracer_provider else {
            return;
        };

        if let Err(source) = provider.shutdown() {
            error!("failed to shutdown tracer provider: {source}");
        }
    }
}
