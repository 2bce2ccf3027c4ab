//! OTLP/HTTP span exporter construction.
//!
//! Building the exporter prepares an HTTP client and validates the endpoint;
//! no connection is opened until the first export.
//!
//! The HTTP client is async and needs a Tokio reactor, but a `simple`
//! processor polls exports on whatever thread ended the span. Every
//! [`OtlpHttpExporter`] therefore owns a one-worker runtime and runs its
//! exports there, so the caller's thread only waits on a join handle.

use crate::domain::kinds::OtlpProtocol;
use crate::domain::ExporterConfig;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::Resource;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// An OTLP/HTTP exporter bound to its own export runtime.
pub struct OtlpHttpExporter {
    inner: opentelemetry_otlp::SpanExporter,
    runtime: Option<Runtime>,
}

impl OtlpHttpExporter {
    fn new(inner: opentelemetry_otlp::SpanExporter) -> Result<Self, String> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("otel-otlp-export")
            .enable_all()
            .build()
            .map_err(|e| format!("failed to start the export runtime: {e}"))?;
        Ok(Self {
            inner,
            runtime: Some(runtime),
        })
    }

    fn run_on_runtime(
        &self,
        future: BoxFuture<'static, ExportResult>,
    ) -> BoxFuture<'static, ExportResult> {
        let Some(runtime) = &self.runtime else {
            return Box::pin(async {
                Err(TraceError::from("OTLP exporter already shut down".to_string()))
            });
        };
        let task = runtime.spawn(future);
        Box::pin(async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(TraceError::from(format!("OTLP export task failed: {e}"))),
            }
        })
    }
}

impl SpanExporter for OtlpHttpExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let future = self.inner.export(batch);
        self.run_on_runtime(future)
    }

    fn shutdown(&mut self) {
        self.inner.shutdown();
    }

    fn force_flush(&mut self) -> BoxFuture<'static, ExportResult> {
        let future = self.inner.force_flush();
        self.run_on_runtime(future)
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.inner.set_resource(resource);
    }
}

impl Drop for OtlpHttpExporter {
    fn drop(&mut self) {
        // Batch workers drop their exporter from inside an async context,
        // where a blocking runtime shutdown would panic.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl fmt::Debug for OtlpHttpExporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtlpHttpExporter")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

/// Builds an OTLP/HTTP span exporter from its configuration.
///
/// `endpoint` is used verbatim, so it should include the signal path
/// (`http://collector:4318/v1/traces`). When absent the exporter falls back
/// to the standard `OTEL_EXPORTER_OTLP_*` environment variables and then to
/// `http://localhost:4318/v1/traces`.
///
/// # Errors
///
/// Returns the exporter builder's error message if the endpoint is not a valid
/// URI or no HTTP client is available, or the reason the export runtime could
/// not start.
pub fn build_otlp_exporter(
    config: &ExporterConfig,
    protocol: OtlpProtocol,
) -> Result<OtlpHttpExporter, String> {
    let mut builder = opentelemetry_otlp::new_exporter()
        .http()
        .with_protocol(match protocol {
            OtlpProtocol::HttpProtobuf => Protocol::HttpBinary,
            OtlpProtocol::HttpJson => Protocol::HttpJson,
        });

    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint.clone());
    }

    if let Some(timeout) = config.timeout {
        builder = builder.with_timeout(Duration::from_millis(timeout));
    }

    if !config.headers.is_empty() {
        let headers: HashMap<String, String> = config
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        builder = builder.with_headers(headers);
    }

    if let Some(compression) = &config.compression {
        tracing::warn!(
            compression = %compression,
            "OTLP/HTTP compression is not supported, sending uncompressed"
        );
    }

    let exporter = builder.build_span_exporter().map_err(|e| e.to_string())?;
    OtlpHttpExporter::new(exporter)
}
