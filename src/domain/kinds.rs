//! Closed enumerations of every component kind the interpreter can build.
//!
//! Configuration documents select components by symbolic name (`"batch"`,
//! `"console"`, `"http/protobuf"`, ...). Those names are parsed into the enums
//! below as early as possible, so the rest of the crate only ever matches on a
//! known variant. A name that does not parse is reported through
//! [`UnknownKind`], which the registry turns into the matching `Unsupported*`
//! error with the offending path attached.

use std::fmt;
use std::str::FromStr;

/// A symbolic name that matched no variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown kind `{}`", self.0)
    }
}

impl std::error::Error for UnknownKind {}

/// Span processor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorKind {
    /// Queues finished spans and exports them in batches from a background worker.
    Batch,
    /// Exports each span synchronously as soon as it ends.
    Simple,
}

impl ProcessorKind {
    /// Every supported processor kind, in registration order.
    pub const ALL: [Self; 2] = [Self::Batch, Self::Simple];

    /// Returns the configuration name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::Simple => "simple",
        }
    }
}

impl FromStr for ProcessorKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Span exporter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExporterKind {
    /// OTLP-JSON lines written to standard output (or an injected sink).
    Console,
    /// OTLP-JSON lines appended to a size-rotated file.
    File,
    /// OTLP over HTTP, protobuf or JSON encoded.
    Otlp,
}

impl ExporterKind {
    /// Every supported exporter type, in registration order.
    pub const ALL: [Self; 3] = [Self::Console, Self::File, Self::Otlp];

    /// Returns the configuration name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::File => "file",
            Self::Otlp => "otlp",
        }
    }

    /// Whether the type is protocol-qualified.
    #[must_use]
    pub const fn requires_protocol(self) -> bool {
        matches!(self, Self::Otlp)
    }
}

impl FromStr for ExporterKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Wire protocols for the OTLP exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OtlpProtocol {
    /// Protobuf-encoded payloads over HTTP.
    #[default]
    HttpProtobuf,
    /// JSON-encoded payloads over HTTP.
    HttpJson,
}

impl OtlpProtocol {
    /// Every supported protocol, in registration order.
    pub const ALL: [Self; 2] = [Self::HttpProtobuf, Self::HttpJson];

    /// Returns the configuration name of this protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HttpProtobuf => "http/protobuf",
            Self::HttpJson => "http/json",
        }
    }
}

impl FromStr for OtlpProtocol {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|protocol| protocol.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Sampler selections for the tracer provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    AlwaysOn,
    AlwaysOff,
    TraceIdRatioBased,
    ParentBased,
}

impl SamplerKind {
    /// Every supported sampler, in registration order.
    pub const ALL: [Self; 4] = [
        Self::AlwaysOn,
        Self::AlwaysOff,
        Self::TraceIdRatioBased,
        Self::ParentBased,
    ];

    /// Returns the configuration name of this sampler.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlwaysOn => "always_on",
            Self::AlwaysOff => "always_off",
            Self::TraceIdRatioBased => "trace_id_ratio_based",
            Self::ParentBased => "parent_based",
        }
    }
}

impl FromStr for SamplerKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Text-map propagators that can be installed alongside the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropagatorKind {
    /// W3C `traceparent`/`tracestate`.
    TraceContext,
    /// W3C `baggage`.
    Baggage,
}

impl PropagatorKind {
    /// Every supported propagator, in registration order.
    pub const ALL: [Self; 2] = [Self::TraceContext, Self::Baggage];

    /// Returns the configuration name of this propagator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TraceContext => "tracecontext",
            Self::Baggage => "baggage",
        }
    }
}

impl FromStr for PropagatorKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
