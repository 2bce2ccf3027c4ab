//! Constructors behind every registry entry.
//!
//! Each function here turns one configuration sub-section into the runtime
//! object it describes. None of them perform I/O: files are opened on first
//! write and HTTP connections on first export.

use crate::domain::kinds::{OtlpProtocol, PropagatorKind};
use crate::domain::{ExporterConfig, ProcessorArgs, SpanLimitsConfig};
use crate::export::{
    otlp, ConfiguredExporter, ConsoleSinkFactory, FileWriter, JsonLinesSpanExporter,
};
use opentelemetry::propagation::{TextMapCompositePropagator, TextMapPropagator};
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};
use opentelemetry_sdk::runtime::TokioCurrentThread;
use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, Builder, SpanLimits};
use opentelemetry_sdk::Resource;
use std::sync::Arc;
use std::time::Duration;

/// Runtime driving batch processors.
///
/// Each batch processor gets its own worker thread with a current-thread
/// Tokio runtime, so assembly works whether or not the caller is inside an
/// async runtime.
pub type BatchRuntime = TokioCurrentThread;

/// Everything an exporter constructor may read.
pub struct ExporterContext<'a> {
    /// Key of the exporter in the `exporters` mapping.
    pub name: &'a str,
    pub config: &'a ExporterConfig,
    pub resource: &'a Resource,
    pub console: &'a ConsoleSinkFactory,
}

/// Builds an exporter, or explains why the configuration cannot produce one.
pub type ExporterConstructor = fn(&ExporterContext<'_>) -> Result<ConfiguredExporter, String>;

/// Wraps a constructed exporter in a span processor.
pub type ProcessorConstructor = fn(ConfiguredExporter, &ProcessorArgs) -> ConfiguredProcessor;

/// A constructed span processor, ready to be attached to a provider builder.
#[derive(Debug)]
pub enum ConfiguredProcessor {
    Simple(ConfiguredExporter),
    Batch(BatchSpanProcessor<BatchRuntime>),
}

impl ConfiguredProcessor {
    /// Appends this processor to the provider being built.
    ///
    /// Processors run in the order they are attached.
    pub fn attach(self, builder: Builder) -> Builder {
        match self {
            Self::Simple(exporter) => builder.with_simple_exporter(exporter),
            Self::Batch(processor) => builder.with_span_processor(processor),
        }
    }
}

pub fn simple(exporter: ConfiguredExporter, _args: &ProcessorArgs) -> ConfiguredProcessor {
    ConfiguredProcessor::Simple(exporter)
}

pub fn batch(exporter: ConfiguredExporter, args: &ProcessorArgs) -> ConfiguredProcessor {
    let mut config = BatchConfigBuilder::default();
    if let Some(delay) = args.schedule_delay {
        config = config.with_scheduled_delay(Duration::from_millis(delay));
    }
    if let Some(timeout) = args.export_timeout {
        config = config.with_max_export_timeout(Duration::from_millis(timeout));
    }
    if let Some(size) = args.max_queue_size {
        config = config.with_max_queue_size(size);
    }
    if let Some(size) = args.max_export_batch_size {
        config = config.with_max_export_batch_size(size);
    }

    let processor = BatchSpanProcessor::builder(exporter, TokioCurrentThread)
        .with_batch_config(config.build())
        .build();
    ConfiguredProcessor::Batch(processor)
}

pub fn console(ctx: &ExporterContext<'_>) -> Result<ConfiguredExporter, String> {
    let sink = (ctx.console)(ctx.name);
    Ok(ConfiguredExporter::JsonLines(JsonLinesSpanExporter::new(
        sink,
        ctx.resource.clone(),
    )))
}

pub fn file(ctx: &ExporterContext<'_>) -> Result<ConfiguredExporter, String> {
    let path = ctx
        .config
        .path
        .clone()
        .ok_or_else(|| "the file exporter requires a `path`".to_string())?;
    Ok(ConfiguredExporter::JsonLines(JsonLinesSpanExporter::new(
        Arc::new(FileWriter::new(path)),
        ctx.resource.clone(),
    )))
}

pub fn otlp_http_protobuf(ctx: &ExporterContext<'_>) -> Result<ConfiguredExporter, String> {
    otlp::build_otlp_exporter(ctx.config, OtlpProtocol::HttpProtobuf).map(ConfiguredExporter::Otlp)
}

pub fn otlp_http_json(ctx: &ExporterContext<'_>) -> Result<ConfiguredExporter, String> {
    otlp::build_otlp_exporter(ctx.config, OtlpProtocol::HttpJson).map(ConfiguredExporter::Otlp)
}

/// Maps `span_limits` onto the SDK limits, keeping SDK defaults for unset fields.
pub fn span_limits(config: &SpanLimitsConfig) -> SpanLimits {
    let defaults = SpanLimits::default();
    if config.attribute_value_length_limit.is_some() {
        tracing::debug!("attribute_value_length_limit is not enforced by the SDK, ignoring");
    }
    SpanLimits {
        max_attributes_per_span: config
            .attribute_count_limit
            .unwrap_or(defaults.max_attributes_per_span),
        max_events_per_span: config
            .event_count_limit
            .unwrap_or(defaults.max_events_per_span),
        max_links_per_span: config
            .link_count_limit
            .unwrap_or(defaults.max_links_per_span),
        max_attributes_per_event: config
            .event_attribute_count_limit
            .unwrap_or(defaults.max_attributes_per_event),
        max_attributes_per_link: config
            .link_attribute_count_limit
            .unwrap_or(defaults.max_attributes_per_link),
    }
}

/// Combines the configured propagators, in order, into one.
pub fn propagator(kinds: &[PropagatorKind]) -> TextMapCompositePropagator {
    let propagators: Vec<Box<dyn TextMapPropagator + Send + Sync>> = kinds
        .iter()
        .map(|kind| -> Box<dyn TextMapPropagator + Send + Sync> {
            match kind {
                PropagatorKind::TraceContext => Box::new(TraceContextPropagator::new()),
                PropagatorKind::Baggage => Box::new(BaggagePropagator::new()),
            }
        })
        .collect();
    TextMapCompositePropagator::new(propagators)
}
