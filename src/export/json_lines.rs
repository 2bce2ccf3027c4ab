//! OTLP-JSON-lines span exporter.
//!
//! Backs both the `console` and `file` exporter types: each exported batch is
//! formatted by [`SpanFormatter`] and written as a single line to a
//! [`LineSink`].

use super::formatter::SpanFormatter;
use super::sink::LineSink;
use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::Resource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Span exporter that writes OTLP JSON, one batch per line.
pub struct JsonLinesSpanExporter {
    sink: Arc<dyn LineSink>,
    formatter: SpanFormatter,
    /// Set once `shutdown` has run; later exports are rejected.
    is_shutdown: AtomicBool,
}

impl JsonLinesSpanExporter {
    /// Creates an exporter writing to `sink`, stamping batches with `resource`.
    pub fn new(sink: Arc<dyn LineSink>, resource: Resource) -> Self {
        Self {
            sink,
            formatter: SpanFormatter::new(resource),
            is_shutdown: AtomicBool::new(false),
        }
    }
}

impl SpanExporter for JsonLinesSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.is_shutdown.load(Ordering::SeqCst) {
            return Box::pin(std::future::ready(Err(TraceError::from(
                "exporter is shut down",
            ))));
        }

        let line = self.formatter.format_batch(&batch).to_string();
        let result = self
            .sink
            .write_line(&line)
            .map_err(|e| TraceError::from(e.to_string()));

        Box::pin(std::future::ready(result))
    }

    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }

    fn set_resource(&mut self, resource: &Resource) {
        self.formatter.set_resource(resource.clone());
    }
}

impl std::fmt::Debug for JsonLinesSpanExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesSpanExporter")
            .field("formatter", &self.formatter)
            .field("is_shutdown", &self.is_shutdown)
            .finish_non_exhaustive()
    }
}
