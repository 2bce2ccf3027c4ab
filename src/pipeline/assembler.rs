use crate::domain::error::{ConfigError, Result};
use crate::domain::kinds::{ProcessorKind, PropagatorKind};
use crate::domain::{
    ConfigDocument, ProcessorArgs, ResourceConfig, SpanProcessorConfig, TracerProviderConfig,
};
use crate::export::ConfiguredExporter;
use crate::registry::{
    constructors, ComponentRegistry, ConfiguredProcessor, ExporterContext, ExporterTarget,
    ProcessorConstructor,
};
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::{Config, TracerProvider};
use opentelemetry_sdk::Resource;
use std::fmt;

/// What one assembled span processor was built from.
///
/// The SDK does not expose a provider's processors, so the assembler records
/// each one as it is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSummary {
    pub kind: ProcessorKind,
    /// Name of the exporter entry the processor feeds.
    pub exporter: String,
    pub target: ExporterTarget,
}

/// The runtime object graph described by a configuration document.
///
/// Owns the tracer provider, which owns its processors, which each own their
/// exporter. A `Pipeline` is either complete or never handed out.
pub struct Pipeline {
    pub(super) resource: Resource,
    pub(super) provider: Option<TracerProvider>,
    pub(super) processors: Vec<ProcessorSummary>,
    pub(super) propagators: Vec<PropagatorKind>,
}

impl Pipeline {
    /// Number of span processors attached to the provider.
    #[must_use]
    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    /// Attached processors, in attachment order.
    #[must_use]
    pub fn processors(&self) -> &[ProcessorSummary] {
        &self.processors
    }

    /// The resource every span is tagged with.
    #[must_use]
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The assembled provider, or `None` when the SDK is disabled.
    #[must_use]
    pub fn tracer_provider(&self) -> Option<&TracerProvider> {
        self.provider.as_ref()
    }

    /// Propagators to install alongside the provider.
    #[must_use]
    pub fn propagators(&self) -> &[PropagatorKind] {
        &self.propagators
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("resource", &self.resource)
            .field("has_provider", &self.provider.is_some())
            .field("processors", &self.processors)
            .field("propagators", &self.propagators)
            .finish()
    }
}

/// Builds a [`Pipeline`] from a parsed document.
///
/// Assembly is all-or-nothing. Every entry is resolved and its exporter
/// constructed before any processor exists, so the first failure only drops
/// idle exporters. Processors (and their batch workers) are started once the
/// whole list is known to be valid.
#[derive(Debug, Clone, Copy)]
pub struct PipelineAssembler<'r> {
    registry: &'r ComponentRegistry,
}

impl<'r> PipelineAssembler<'r> {
    #[must_use]
    pub const fn new(registry: &'r ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Assembles the pipeline a document describes.
    ///
    /// # Steps
    ///
    /// 1. Build the resource from `sdk.resource.attributes`.
    /// 2. With `sdk.disabled`, stop: no provider.
    /// 3. Without `sdk.tracer_provider`, stop: a provider with no processors.
    /// 4. For each entry of `span_processors`, in order: resolve its kind,
    ///    look up its exporter entry, resolve the exporter type and protocol,
    ///    then construct the exporter.
    /// 5. Wrap each exporter in its processor, attach them in declaration
    ///    order and build the provider.
    ///
    /// # Errors
    ///
    /// The first `Unsupported*`, [`ConfigError::UnknownExporterReference`] or
    /// [`ConfigError::ExporterConstruction`] encountered, naming the offending
    /// configuration path.
    pub fn assemble(&self, document: &ConfigDocument) -> Result<Pipeline> {
        let span = tracing::debug_span!("assemble_pipeline");
        let _enter = span.enter();

        let sdk = &document.sdk;
        let resource = build_resource(&sdk.resource);

        if sdk.disabled {
            tracing::debug!("SDK disabled, skipping tracer provider");
            return Ok(Pipeline {
                resource,
                provider: None,
                processors: Vec::new(),
                propagators: Vec::new(),
            });
        }

        let propagators = self.registry.resolve_propagators(&sdk.propagators)?;

        let Some(config) = &sdk.tracer_provider else {
            tracing::debug!("no tracer_provider section, building a provider without processors");
            let provider = TracerProvider::builder()
                .with_config(Config::default().with_resource(resource.clone()))
                .build();
            return Ok(Pipeline {
                resource,
                provider: Some(provider),
                processors: Vec::new(),
                propagators,
            });
        };

        let trace_config = self.trace_config(config, &resource)?;

        let mut pending = Vec::with_capacity(config.span_processors.len());
        let mut processors = Vec::with_capacity(config.span_processors.len());
        for (index, entry) in config.span_processors.iter().enumerate() {
            let (processor, summary) = self.prepare_processor(index, entry, config, &resource)?;
            pending.push(processor);
            processors.push(summary);
        }

        let provider = pending
            .into_iter()
            .map(PendingProcessor::start)
            .fold(
                TracerProvider::builder().with_config(trace_config),
                |builder, processor| processor.attach(builder),
            )
            .build();

        tracing::debug!(
            processors = processors.len(),
            exporters = config.exporters.len(),
            "tracer provider assembled"
        );

        Ok(Pipeline {
            resource,
            provider: Some(provider),
            processors,
            propagators,
        })
    }

    fn trace_config(&self, config: &TracerProviderConfig, resource: &Resource) -> Result<Config> {
        let mut trace_config = Config::default().with_resource(resource.clone());
        if let Some(sampler) = self.registry.resolve_sampler(config)? {
            trace_config = trace_config.with_sampler(sampler);
        }
        if let Some(limits) = &config.span_limits {
            trace_config = trace_config.with_span_limits(constructors::span_limits(limits));
        }
        Ok(trace_config)
    }

    fn prepare_processor<'d>(
        &self,
        index: usize,
        entry: &'d SpanProcessorConfig,
        config: &TracerProviderConfig,
        resource: &Resource,
    ) -> Result<(PendingProcessor<'d>, ProcessorSummary)> {
        let entry_path = format!("sdk.tracer_provider.span_processors[{index}]");

        let (kind, make_processor) = self
            .registry
            .resolve_processor(&entry.name, &format!("{entry_path}.name"))?;

        let exporter_name = entry.args.exporter.as_str();
        let exporter_config = config.exporters.get(exporter_name).ok_or_else(|| {
            ConfigError::UnknownExporterReference {
                path: format!("{entry_path}.args.exporter"),
                name: exporter_name.to_string(),
            }
        })?;

        let exporter_path = format!("sdk.tracer_provider.exporters.{exporter_name}");
        let (target, make_exporter) = self.registry.resolve_exporter(
            exporter_config.kind_or(exporter_name),
            exporter_config.protocol.as_deref(),
            &exporter_path,
        )?;

        let exporter = make_exporter(&ExporterContext {
            name: exporter_name,
            config: exporter_config,
            resource,
            console: self.registry.console_sink(),
        })
        .map_err(|message| ConfigError::ExporterConstruction {
            path: exporter_path,
            message,
        })?;

        tracing::debug!(
            index,
            processor = kind.as_str(),
            exporter = exporter_name,
            exporter_type = target.kind().as_str(),
            protocol = target.protocol().map(|p| p.as_str()),
            "span processor resolved"
        );

        Ok((
            PendingProcessor {
                exporter,
                make_processor,
                args: &entry.args,
            },
            ProcessorSummary {
                kind,
                exporter: exporter_name.to_string(),
                target,
            },
        ))
    }
}

/// A resolved entry whose exporter exists but whose processor has not been
/// started yet.
struct PendingProcessor<'d> {
    exporter: ConfiguredExporter,
    make_processor: ProcessorConstructor,
    args: &'d ProcessorArgs,
}

impl PendingProcessor<'_> {
    fn start(self) -> ConfiguredProcessor {
        (self.make_processor)(self.exporter, self.args)
    }
}

/// Turns `sdk.resource.attributes` into a resource. No attributes, empty resource.
fn build_resource(config: &ResourceConfig) -> Resource {
    if config.attributes.is_empty() {
        return Resource::empty();
    }
    Resource::new(
        config
            .attributes
            .iter()
            .map(|(key, value)| KeyValue::new(key.clone(), opentelemetry::Value::from(value))),
    )
}
