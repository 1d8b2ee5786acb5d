use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Initialize the tracing subscriber: env-filter + JSON fmt layer, plus an
/// OTLP pipeline when `otlp_endpoint` is set.
///
/// The service also runs standalone (tests, local dev), so a missing
/// collector endpoint downgrades to fmt-only output instead of failing.
pub fn init_tracing(service_name: &str, log_level: &str, otlp_endpoint: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match otlp_endpoint {
        Some(endpoint) if !endpoint.is_empty() => {
            let otlp_exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            match opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(otlp_exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", service_name.to_string()),
                ])))
                .install_batch(runtime::Tokio)
            {
                Ok(tracer) => {
                    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
                    registry.with(telemetry).with(fmt_layer()).init();
                }
                Err(e) => {
                    eprintln!(
                        "Failed to initialize OTLP tracer for '{}' at '{}': {}; continuing without export",
                        service_name, endpoint, e
                    );
                    registry.with(fmt_layer()).init();
                }
            }
        }
        _ => {
            registry.with(fmt_layer()).init();
        }
    }
}

/// Generic over the subscriber stack so each branch of [`init_tracing`] gets
/// its own instantiation (the OTLP branch carries an extra telemetry layer).
fn fmt_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .json()
        .flatten_event(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The global subscriber can only be installed once per process, so a
    // single test exercises the fmt-only path.
    #[test]
    fn fmt_only_init_does_not_panic() {
        init_tracing("docflow-test", "info", None);
        tracing::info!("subscriber installed");
    }
}
