//! Tracing and OpenTelemetry initialisation for conesim.
//!
//! Call [`init_tracing`] once at process startup, before any task is created.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set, cycle spans are exported over OTLP/HTTP. |
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `CONESIM_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//!
//! # Example
//!
//! ```rust,no_run
//! // Hold the guard until the pipeline has been joined.
//! let _guard = conesim_runtime::telemetry::init_tracing("conesim");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the console layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    /// Read `CONESIM_LOG_FORMAT`; anything but `json` means compact.
    pub fn from_env() -> Self {
        match std::env::var("CONESIM_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Install the global `tracing` subscriber: an `EnvFilter`, a console layer
/// in the [`LogFormat`] chosen by the environment and, when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an OpenTelemetry layer.
///
/// The returned [`TracerProviderGuard`] must outlive every task; dropping it
/// flushes pending spans.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = LogFormat::from_env();
    let provider = build_provider(service_name);

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("conesim")));
    let json_layer = (format == LogFormat::Json).then(|| fmt::layer().json());
    let compact_layer = (format == LogFormat::Compact).then(|| fmt::layer().compact());

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(json_layer)
        .with(compact_layer)
        .try_init();
    if let Err(e) = installed {
        eprintln!("[conesim] tracing subscriber already installed: {e}");
    }

    TracerProviderGuard(provider)
}

/// Shuts the OpenTelemetry [`SdkTracerProvider`] down on drop, flushing any
/// spans still pending.  Hold it in `main` for the whole run.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl TracerProviderGuard {
    /// `true` when spans are being exported.
    pub fn is_exporting(&self) -> bool {
        self.0.is_some()
    }
}

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("[conesim] OpenTelemetry provider shutdown error: {e}");
            }
        }
    }
}

/// `None` when `OTEL_EXPORTER_OTLP_ENDPOINT` is unset or the exporter cannot
/// be built (reported on stderr; console logging still works).
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[conesim] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    // Tasks are plain OS threads with no async runtime, so spans are
    // exported synchronously.
    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            .with_simple_exporter(exporter)
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_provider_without_endpoint() {
        // SAFETY: no other test in this crate reads this variable.
        unsafe { std::env::remove_var("OTEL_EXPORTER_OTLP_ENDPOINT") };
        assert!(build_provider("conesim-test").is_none());
    }

    #[test]
    fn empty_guard_drops_quietly() {
        let guard = TracerProviderGuard(None);
        assert!(!guard.is_exporting());
        drop(guard);
    }

    #[test]
    fn log_format_defaults_to_compact() {
        // SAFETY: no other test in this crate reads this variable.
        unsafe { std::env::remove_var("CONESIM_LOG_FORMAT") };
        assert_eq!(LogFormat::from_env(), LogFormat::Compact);
    }
}
