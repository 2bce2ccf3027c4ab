//! Registry mapping symbolic component names to constructors.
//!
//! The registry has two independent namespaces:
//!
//! - **processor kinds**: `batch`, `simple`
//! - **exporter types**: `console`, `file`, and the protocol-qualified
//!   `otlp` + `http/protobuf` | `http/json`
//!
//! plus the smaller sampler and propagator namespaces used by the tracer
//! provider itself.
//!
//! Names are first parsed into the closed enums of
//! [`kinds`](crate::domain::kinds); the enum → constructor mapping is then a
//! plain `match`, so every supported variant is guaranteed to have a
//! constructor. A name that parses to nothing becomes the matching
//! `Unsupported*` error, annotated with the configuration path and, when a
//! registered name is close, a "did you mean" hint.
//!
//! The registry is immutable once built. [`ComponentRegistry::global`] holds
//! the process-wide default; callers that need a different console sink build
//! their own with [`ComponentRegistry::with_console_sink`].

pub mod constructors;
mod suggest;

pub use constructors::{
    BatchRuntime, ConfiguredProcessor, ExporterConstructor, ExporterContext, ProcessorConstructor,
};

use crate::domain::error::{ConfigError, Result};
use crate::domain::kinds::{ExporterKind, OtlpProtocol, ProcessorKind, PropagatorKind, SamplerKind};
use crate::domain::TracerProviderConfig;
use crate::export::{stdout_factory, ConsoleSinkFactory, LineSink};
use opentelemetry_sdk::trace::Sampler;
use std::sync::{Arc, OnceLock};

/// A fully resolved exporter selection: type plus protocol where one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExporterTarget {
    Console,
    File,
    Otlp(OtlpProtocol),
}

impl ExporterTarget {
    /// The exporter type this target belongs to.
    #[must_use]
    pub const fn kind(self) -> ExporterKind {
        match self {
            Self::Console => ExporterKind::Console,
            Self::File => ExporterKind::File,
            Self::Otlp(_) => ExporterKind::Otlp,
        }
    }

    /// The protocol, for protocol-qualified types.
    #[must_use]
    pub const fn protocol(self) -> Option<OtlpProtocol> {
        match self {
            Self::Otlp(protocol) => Some(protocol),
            Self::Console | Self::File => None,
        }
    }
}

/// Static mapping from component kinds to their constructors.
pub struct ComponentRegistry {
    console: ConsoleSinkFactory,
}

impl ComponentRegistry {
    /// Creates a registry whose console exporters write to standard output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            console: stdout_factory(),
        }
    }

    /// Returns the process-wide default registry.
    ///
    /// Built on first use and read-only afterwards.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<ComponentRegistry> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Replaces the sink console exporters write to.
    ///
    /// `factory` is called once per console exporter with the exporter's name.
    ///
    /// # Example
    ///
    /// ```
    /// use otel_fileconfig::{ComponentRegistry, LineSink, StdoutSink};
    /// use std::sync::Arc;
    ///
    /// let registry = ComponentRegistry::new()
    ///     .with_console_sink(|_name| Arc::new(StdoutSink) as Arc<dyn LineSink>);
    /// ```
    #[must_use]
    pub fn with_console_sink<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn LineSink> + Send + Sync + 'static,
    {
        self.console = Arc::new(factory);
        self
    }

    /// The console sink factory handed to exporter constructors.
    #[must_use]
    pub fn console_sink(&self) -> &ConsoleSinkFactory {
        &self.console
    }

    /// Returns the constructor for a processor kind.
    #[must_use]
    pub const fn processor_constructor(kind: ProcessorKind) -> ProcessorConstructor {
        match kind {
            ProcessorKind::Batch => constructors::batch,
            ProcessorKind::Simple => constructors::simple,
        }
    }

    /// Returns the constructor for an exporter target.
    #[must_use]
    pub const fn exporter_constructor(target: ExporterTarget) -> ExporterConstructor {
        match target {
            ExporterTarget::Console => constructors::console,
            ExporterTarget::File => constructors::file,
            ExporterTarget::Otlp(OtlpProtocol::HttpProtobuf) => constructors::otlp_http_protobuf,
            ExporterTarget::Otlp(OtlpProtocol::HttpJson) => constructors::otlp_http_json,
        }
    }

    /// Resolves a processor kind by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedProcessorKind`] naming `path` if
    /// `name` is not a registered kind.
    pub fn resolve_processor(
        &self,
        name: &str,
        path: &str,
    ) -> Result<(ProcessorKind, ProcessorConstructor)> {
        let kind: ProcessorKind =
            name.parse()
                .map_err(|_| ConfigError::UnsupportedProcessorKind {
                    path: path.to_string(),
                    kind: name.to_string(),
                    hint: suggest::closest(name, ProcessorKind::ALL.map(ProcessorKind::as_str)),
                })?;
        Ok((kind, Self::processor_constructor(kind)))
    }

    /// Resolves an exporter type, and its protocol when the type needs one.
    ///
    /// `path` is the exporter's entry (`sdk.tracer_provider.exporters.<name>`);
    /// errors point at its `type` or `protocol` field. A missing protocol on a
    /// protocol-qualified type selects `http/protobuf`. A protocol given to a
    /// type that has none is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedExporterType`] for an unknown type and
    /// [`ConfigError::UnsupportedProtocol`] for an unknown protocol.
    pub fn resolve_exporter(
        &self,
        kind: &str,
        protocol: Option<&str>,
        path: &str,
    ) -> Result<(ExporterTarget, ExporterConstructor)> {
        let exporter_kind: ExporterKind =
            kind.parse()
                .map_err(|_| ConfigError::UnsupportedExporterType {
                    path: format!("{path}.type"),
                    kind: kind.to_string(),
                    hint: suggest::closest(kind, ExporterKind::ALL.map(ExporterKind::as_str)),
                })?;

        if let (false, Some(protocol)) = (exporter_kind.requires_protocol(), protocol) {
            tracing::debug!(
                exporter_type = exporter_kind.as_str(),
                protocol = %protocol,
                "ignoring protocol on an exporter type without one"
            );
        }

        let target = match exporter_kind {
            ExporterKind::Console => ExporterTarget::Console,
            ExporterKind::File => ExporterTarget::File,
            ExporterKind::Otlp => {
                let protocol = match protocol {
                    None => OtlpProtocol::default(),
                    Some(name) => {
                        name.parse()
                            .map_err(|_| ConfigError::UnsupportedProtocol {
                                path: format!("{path}.protocol"),
                                protocol: name.to_string(),
                                hint: suggest::closest(
                                    name,
                                    OtlpProtocol::ALL.map(OtlpProtocol::as_str),
                                ),
                            })?
                    }
                };
                ExporterTarget::Otlp(protocol)
            }
        };

        Ok((target, Self::exporter_constructor(target)))
    }

    /// Resolves a propagator list.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedPropagator`] for the first unknown name.
    pub fn resolve_propagators(&self, names: &[String]) -> Result<Vec<PropagatorKind>> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                name.parse().map_err(|_| ConfigError::UnsupportedPropagator {
                    path: format!("sdk.propagators[{i}]"),
                    name: name.clone(),
                    hint: suggest::closest(name, PropagatorKind::ALL.map(PropagatorKind::as_str)),
                })
            })
            .collect()
    }

    /// Builds the sampler a tracer provider section asks for.
    ///
    /// Returns `Ok(None)` when no sampler is configured, leaving the SDK
    /// default (parent-based, always on) in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedSampler`] for unknown sampler names,
    /// including a `parent_based` root that is itself `parent_based`, and
    /// [`ConfigError::IncompleteSampler`] when `trace_id_ratio_based` has no
    /// ratio.
    pub fn resolve_sampler(&self, config: &TracerProviderConfig) -> Result<Option<Sampler>> {
        let Some(name) = config.sampler.as_deref() else {
            return Ok(None);
        };
        let kind = parse_sampler(name, "sdk.tracer_provider.sampler")?;

        let ratio = || {
            config
                .sampler_config
                .as_ref()
                .and_then(|c| c.trace_id_ratio_based.as_ref())
                .map(|c| c.ratio)
                .ok_or_else(|| ConfigError::IncompleteSampler {
                    path: "sdk.tracer_provider.sampler_config.trace_id_ratio_based.ratio"
                        .to_string(),
                    name: SamplerKind::TraceIdRatioBased.as_str().to_string(),
                })
        };

        let sampler = match kind {
            SamplerKind::AlwaysOn => Sampler::AlwaysOn,
            SamplerKind::AlwaysOff => Sampler::AlwaysOff,
            SamplerKind::TraceIdRatioBased => Sampler::TraceIdRatioBased(ratio()?),
            SamplerKind::ParentBased => {
                let root_path = "sdk.tracer_provider.sampler_config.parent_based.root";
                let root_name = config
                    .sampler_config
                    .as_ref()
                    .and_then(|c| c.parent_based.as_ref())
                    .and_then(|c| c.root.as_deref())
                    .unwrap_or(SamplerKind::AlwaysOn.as_str());
                let root = match parse_sampler(root_name, root_path)? {
                    SamplerKind::AlwaysOn => Sampler::AlwaysOn,
                    SamplerKind::AlwaysOff => Sampler::AlwaysOff,
                    SamplerKind::TraceIdRatioBased => Sampler::TraceIdRatioBased(ratio()?),
                    SamplerKind::ParentBased => {
                        return Err(ConfigError::UnsupportedSampler {
                            path: root_path.to_string(),
                            name: root_name.to_string(),
                            hint: Default::default(),
                        })
                    }
                };
                Sampler::ParentBased(Box::new(root))
            }
        };

        Ok(Some(sampler))
    }
}

fn parse_sampler(name: &str, path: &str) -> Result<SamplerKind> {
    name.parse().map_err(|_| ConfigError::UnsupportedSampler {
        path: path.to_string(),
        name: name.to_string(),
        hint: suggest::closest(name, SamplerKind::ALL.map(SamplerKind::as_str)),
    })
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("processors", &ProcessorKind::ALL)
            .field("exporters", &ExporterKind::ALL)
            .field("protocols", &OtlpProtocol::ALL)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{ParentBasedSamplerConfig, RatioSamplerConfig, SamplerConfig};

    #[test]
    fn resolves_every_registered_processor() {
        let registry = ComponentRegistry::new();
        for kind in ProcessorKind::ALL {
            let (resolved, _) = registry.resolve_processor(kind.as_str(), "p").unwrap();
            assert_eq!(resolved, kind);
        }
    }

    #[test]
    fn unknown_processor_carries_path_and_hint() {
        let err = ComponentRegistry::new()
            .resolve_processor("batched", "sdk.tracer_provider.span_processors[2].name")
            .err()
            .unwrap();

        match err {
            ConfigError::UnsupportedProcessorKind { path, kind, hint } => {
                assert_eq!(path, "sdk.tracer_provider.span_processors[2].name");
                assert_eq!(kind, "batched");
                assert_eq!(hint.suggestion(), Some("batch"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn otlp_protocol_defaults_to_protobuf() {
        let (target, _) = ComponentRegistry::new()
            .resolve_exporter("otlp", None, "sdk.tracer_provider.exporters.otlp")
            .unwrap();
        assert_eq!(target, ExporterTarget::Otlp(OtlpProtocol::HttpProtobuf));
        assert_eq!(target.kind(), ExporterKind::Otlp);
    }

    #[test]
    fn grpc_is_an_unsupported_protocol() {
        let err = ComponentRegistry::new()
            .resolve_exporter("otlp", Some("grpc"), "sdk.tracer_provider.exporters.collector")
            .err()
            .unwrap();

        assert!(matches!(
            err,
            ConfigError::UnsupportedProtocol { ref path, ref protocol, .. }
                if path == "sdk.tracer_provider.exporters.collector.protocol" && protocol == "grpc"
        ));
    }

    #[test]
    fn console_ignores_protocol() {
        let (target, _) = ComponentRegistry::new()
            .resolve_exporter("console", Some("grpc"), "x")
            .unwrap();
        assert_eq!(target, ExporterTarget::Console);
        assert_eq!(target.protocol(), None);
    }

    #[test]
    fn unknown_exporter_type_points_at_type_field() {
        let err = ComponentRegistry::new()
            .resolve_exporter("zipkin", None, "sdk.tracer_provider.exporters.zipkin")
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "unsupported exporter type `zipkin` at sdk.tracer_provider.exporters.zipkin.type"
        );
    }

    #[test]
    fn propagators_resolve_in_order() {
        let names = vec!["baggage".to_string(), "tracecontext".to_string()];
        assert_eq!(
            ComponentRegistry::new().resolve_propagators(&names).unwrap(),
            vec![PropagatorKind::Baggage, PropagatorKind::TraceContext]
        );

        let err = ComponentRegistry::new()
            .resolve_propagators(&["tracecontext".to_string(), "b3multi".to_string()])
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::UnsupportedPropagator { ref path, .. } if path == "sdk.propagators[1]")
        );
    }

    #[test]
    fn sampler_resolution() {
        let registry = ComponentRegistry::new();

        let none = TracerProviderConfig::default();
        assert!(registry.resolve_sampler(&none).unwrap().is_none());

        let ratio = TracerProviderConfig {
            sampler: Some("parent_based".to_string()),
            sampler_config: Some(SamplerConfig {
                trace_id_ratio_based: Some(RatioSamplerConfig { ratio: 0.25 }),
                parent_based: Some(ParentBasedSamplerConfig {
                    root: Some("trace_id_ratio_based".to_string()),
                }),
            }),
            ..Default::default()
        };
        assert!(matches!(
            registry.resolve_sampler(&ratio).unwrap(),
            Some(Sampler::ParentBased(_))
        ));

        let missing_ratio = TracerProviderConfig {
            sampler: Some("trace_id_ratio_based".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            registry.resolve_sampler(&missing_ratio),
            Err(ConfigError::IncompleteSampler { ref path, ref name })
                if path == "sdk.tracer_provider.sampler_config.trace_id_ratio_based.ratio"
                    && name == "trace_id_ratio_based"
        ));

        let unknown = TracerProviderConfig {
            sampler: Some("jaeger_remote".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            registry.resolve_sampler(&unknown),
            Err(ConfigError::UnsupportedSampler { .. })
        ));
    }
}
