//! Span exporters the interpreter can instantiate.
//!
//! Every exporter a configuration can ask for is a variant of
//! [`ConfiguredExporter`], a closed enum that implements the SDK's
//! `SpanExporter` trait by delegation. Keeping the set closed means a
//! processor always wraps a concrete, known exporter; there is no dynamic
//! lookup after assembly.
//!
//! ```text
//! console ─┐
//!          ├─ JsonLinesSpanExporter ─ SpanFormatter ─ LineSink (stdout | FileWriter)
//! file ────┘
//! otlp ────── OtlpHttpExporter ─ opentelemetry_otlp::SpanExporter (http/protobuf | http/json)
//! ```
//!
//! # Modules
//!
//! - [`formatter`]: OTLP JSON span serialization
//! - [`json_lines`]: exporter writing one JSON document per batch
//! - [`sink`]: line-oriented output targets
//! - [`file_writer`]: size-rotated file sink
//! - [`otlp`]: OTLP/HTTP exporter construction

pub mod file_writer;
pub mod formatter;
pub mod json_lines;
pub mod otlp;
pub mod sink;

pub use file_writer::FileWriter;
pub use json_lines::JsonLinesSpanExporter;
pub use otlp::OtlpHttpExporter;
pub use sink::{stdout_factory, ConsoleSinkFactory, LineSink, StdoutSink};

use futures_util::future::BoxFuture;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::Resource;

/// A fully constructed exporter of one of the supported types.
#[derive(Debug)]
pub enum ConfiguredExporter {
    /// `console` or `file`.
    JsonLines(JsonLinesSpanExporter),
    /// `otlp`.
    Otlp(OtlpHttpExporter),
}

impl SpanExporter for ConfiguredExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        match self {
            Self::JsonLines(exporter) => exporter.export(batch),
            Self::Otlp(exporter) => exporter.export(batch),
        }
    }

    fn shutdown(&mut self) {
        match self {
            Self::JsonLines(exporter) => exporter.shutdown(),
            Self::Otlp(exporter) => exporter.shutdown(),
        }
    }

    fn force_flush(&mut self) -> BoxFuture<'static, ExportResult> {
        match self {
            Self::JsonLines(exporter) => exporter.force_flush(),
            Self::Otlp(exporter) => exporter.force_flush(),
        }
    }

    fn set_resource(&mut self, resource: &Resource) {
        match self {
            Self::JsonLines(exporter) => exporter.set_resource(resource),
            Self::Otlp(exporter) => exporter.set_resource(resource),
        }
    }
}
