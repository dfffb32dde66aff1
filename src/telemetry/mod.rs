//! Telemetry initialization: metrics, tracing, and structured logging

pub mod metrics;
pub mod tracing_setup;

use crate::config::TelemetryConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Handles owned by the process for the lifetime of the server
pub struct Telemetry {
    /// Present when metrics are enabled; backs the `/metrics` endpoint
    pub prometheus: Option<PrometheusHandle>,
    tracer_provider: Option<SdkTracerProvider>,
}

impl Telemetry {
    /// Flush pending spans
    pub fn shutdown(self) {
        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                eprintln!("WARN: OpenTelemetry shutdown failed: {}", e);
            }
        }
    }
}

/// Initialise the full telemetry stack.
pub fn init(config: &TelemetryConfig) -> anyhow::Result<Telemetry> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "idlink_core=info,tower_http=info".into());

    let prometheus = if config.metrics_enabled {
        let handle = metrics::install_prometheus_recorder()?;
        metrics::describe_metrics();
        Some(handle)
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    // The OpenTelemetry layer's subscriber type must match the composed stack,
    // so each format branch builds its own.
    let tracer_provider = if config.log_format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true);
        let otel = tracing_setup::create_otel_layer(config)?;
        let (otel_layer, provider) = otel.unzip();
        registry.with(fmt_layer).with(otel_layer).try_init()?;
        provider
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let otel = tracing_setup::create_otel_layer(config)?;
        let (otel_layer, provider) = otel.unzip();
        registry.with(fmt_layer).with(otel_layer).try_init()?;
        provider
    };

    Ok(Telemetry {
        prometheus,
        tracer_provider,
    })
}
