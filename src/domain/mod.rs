//! Domain layer for the configuration interpreter.
//!
//! This module contains the configuration data model, the closed enumerations
//! of buildable component kinds and the crate's error type. It has no knowledge
//! of the OpenTelemetry SDK objects those configurations turn into; that
//! translation lives in [`registry`](crate::registry) and
//! [`pipeline`](crate::pipeline).
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`document`]: Configuration document model and text formats
//! - [`kinds`]: Processor, exporter, protocol, sampler and propagator kinds

pub mod document;
pub mod error;
pub mod kinds;

pub use document::{
    load_value, ConfigDocument, DocumentFormat, ExporterConfig, ProcessorArgs, ResourceConfig,
    ScalarValue, SdkConfig, SpanLimitsConfig, SpanProcessorConfig, TracerProviderConfig,
};
pub use error::{ConfigError, Hint, Result};
pub use kinds::{ExporterKind, OtlpProtocol, ProcessorKind, PropagatorKind, SamplerKind, UnknownKind};
