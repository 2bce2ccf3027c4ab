//! Tracing subscriber setup.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::TracerProvider;
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Instrumentation scope name for spans the binary records itself.
pub const INSTRUMENTATION_NAME: &str = "otel-fileconfig";

/// Builds the filter: `RUST_LOG` when set, otherwise `level`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// The human-readable log layer. Writes to stderr so console exporters own stdout.
fn fmt_layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
}

/// A subscriber that only logs, for use before a pipeline exists.
///
/// Meant for [`tracing::subscriber::with_default`], so that diagnostics from
/// loading and assembling a configuration are visible without committing the
/// process-wide subscriber.
///
/// # Parameters
///
/// * `level` - Filter directive used when `RUST_LOG` is unset
#[must_use]
pub fn bootstrap_subscriber(level: &str) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt_layer())
}

/// Installs the process-wide subscriber.
///
/// Sets up a subscriber pipeline that:
/// 1. Filters spans and events by `RUST_LOG`, falling back to `level`
/// 2. Logs to stderr
/// 3. When `provider` is given, records spans through it via
///    `tracing-opentelemetry`
///
/// # Initialization Behavior
///
/// Idempotent: only the first call in a process takes effect.
///
/// # Example
///
/// ```rust
/// use otel_fileconfig::observability::init_tracing;
///
/// init_tracing("info", None);
///
/// tracing::info!("tracing is now active");
/// ```
pub fn init_tracing(level: &str, provider: Option<&TracerProvider>) {
    let otel_layer =
        provider.map(|provider| OpenTelemetryLayer::new(provider.tracer(INSTRUMENTATION_NAME)));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt_layer())
        .with(otel_layer);

    let _ = subscriber.try_init();
}
