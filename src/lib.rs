//! otel-fileconfig: declarative configuration for the OpenTelemetry tracing SDK.
//!
//! A configuration document describes a tracer pipeline: the resource every
//! span carries, the exporters spans are sent to, and the span processors
//! connecting them. This crate validates such a document against a published
//! JSON schema and assembles the live object graph it describes:
//! - Draft-06 schema validation with path-addressed findings
//! - A closed registry of processor kinds, exporter types and protocols
//! - All-or-nothing assembly that names the offending path on failure
//! - A run-once, time-bounded shutdown bound to the assembled provider

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  ConfigurationFacade (facade)                       │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐
//! │ Schema        │   │ Pipeline      │   │ Lifecycle         │
//! │ (schema/)     │   │ (pipeline/)   │   │ (pipeline/)       │
//! │ - Draft-06    │   │ - Assembler   │   │ - Bounded flush   │
//! │ - Findings    │   │ - Ordering    │   │ - Global install  │
//! └───────────────┘   └───────────────┘   └───────────────────┘
//!                            │
//! ┌─────────────────────────────────────────────────────┐
//! │  Registry (registry/) and Exporters (export/)       │
//! │  - kind → constructor, "did you mean" hints         │
//! │  - console / file JSON lines, OTLP/HTTP             │
//! └─────────────────────────────────────────────────────┘
//!                            │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/)                                   │
//! │  - Document model, closed kind enums, errors        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`domain`]: Document model, component kinds and errors
//! - [`schema`]: JSON schema validation
//! - [`registry`]: Component registry
//! - [`export`]: Span exporters
//! - [`pipeline`]: Assembly and lifecycle
//! - [`facade`]: The `apply` entry point
//! - [`infrastructure`]: Environment path settings
//! - [`observability`]: `tracing` subscriber setup for binaries
//!
//! # Configuration document
//!
//! ```yaml
//! sdk:
//!   resource:
//!     attributes:
//!       service.name: checkout
//!   propagators: [tracecontext, baggage]
//!   tracer_provider:
//!     exporters:
//!       console: {}
//!       collector:
//!         type: otlp
//!         protocol: http/protobuf
//!         endpoint: http://localhost:4318/v1/traces
//!     span_processors:
//!       - name: simple
//!         args: { exporter: console }
//!       - name: batch
//!         args: { exporter: collector }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use otel_fileconfig::{ApplyOptions, ConfigurationFacade, DocumentFormat};
//! use serde_json::json;
//!
//! let schema = json!({"type": "object", "required": ["sdk"]});
//! let document = r#"
//! sdk:
//!   tracer_provider:
//!     exporters:
//!       e1: { type: console }
//!     span_processors:
//!       - name: simple
//!         args: { exporter: e1 }
//! "#;
//!
//! let facade = ConfigurationFacade::new(ApplyOptions::default());
//! let bound = facade.apply_str(&schema, document, DocumentFormat::Yaml)?;
//!
//! assert_eq!(bound.processor_count(), 1);
//! bound.shutdown()?;
//! # Ok::<(), otel_fileconfig::ConfigError>(())
//! ```
//!
//! # Key Design Decisions
//!
//! ## Closed Component Kinds
//!
//! Every symbolic name in a document is parsed into a closed enum, and the
//! registry maps each variant to its constructor with a `match`:
//! - An unsupported name is an error naming its path, never a skipped processor
//! - Adding a kind is a compile error until it has a constructor
//!
//! ## Explicit Process-Wide State
//!
//! Nothing is installed globally unless asked for. The caller owns the
//! [`BoundPipeline`] and decides where it lives; dropping it flushes and shuts
//! down.

pub mod domain;
pub mod export;
pub mod facade;
pub mod infrastructure;
pub mod observability;
pub mod pipeline;
pub mod registry;
pub mod schema;

pub use domain::{
    load_value, ConfigDocument, ConfigError, DocumentFormat, ExporterConfig, ExporterKind, Hint,
    OtlpProtocol, ProcessorKind, PropagatorKind, Result, SamplerKind, TracerProviderConfig,
};
pub use export::{LineSink, StdoutSink};
pub use facade::{ApplyOptions, ConfigurationFacade, ValidationPolicy};
pub use pipeline::{
    BoundPipeline, LifecycleBinder, Pipeline, PipelineAssembler, ProcessorSummary, ShutdownHandle,
};
pub use registry::{ComponentRegistry, ExporterTarget};
pub use schema::{load_schema, validate, SchemaValidator, ValidationFinding};
