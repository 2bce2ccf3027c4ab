//! Error types for the configuration interpreter.
//!
//! This module defines the centralized error type [`ConfigError`] and a type alias
//! [`Result`] used throughout the crate. Every assembly-stage variant names the
//! dotted configuration path of the offending entry, so callers can point users
//! at the exact line of their document that needs fixing.

use crate::schema::ValidationFinding;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// The main error type for loading, validating and assembling a configuration.
///
/// Variants fall into three groups:
///
/// - **Input**: [`Io`](Self::Io), [`MalformedDocument`](Self::MalformedDocument),
///   [`InvalidSchema`](Self::InvalidSchema) and
///   [`SchemaViolation`](Self::SchemaViolation) are raised before any runtime
///   object exists.
/// - **Assembly**: the `Unsupported*`, [`UnknownExporterReference`](Self::UnknownExporterReference)
///   and [`ExporterConstruction`](Self::ExporterConstruction) variants abort the
///   whole `apply` call. No partially wired pipeline is ever handed back.
/// - **Lifecycle**: concurrency and shutdown failures.
///
/// # Examples
///
/// ```
/// use otel_fileconfig::ConfigError;
///
/// let err = ConfigError::UnknownExporterReference {
///     path: "sdk.tracer_provider.span_processors[0].args.exporter".to_string(),
///     name: "missing".to_string(),
/// };
/// assert!(err.to_string().contains("missing"));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input could not be parsed into the configuration data model.
    ///
    /// Raised for syntactically broken JSON/YAML/TOML and for documents whose
    /// shape cannot be mapped onto [`ConfigDocument`](crate::ConfigDocument).
    #[error("malformed configuration document: {0}")]
    MalformedDocument(String),

    /// The schema document itself is not a usable JSON schema.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// The document violated the schema and the strict validation policy is in force.
    #[error("configuration failed schema validation with {} finding(s)", findings.len())]
    SchemaViolation {
        /// Every finding reported by the validator.
        findings: Vec<ValidationFinding>,
    },

    /// A span processor names a kind with no registered constructor.
    #[error("unsupported span processor `{kind}` at {path}{hint}")]
    UnsupportedProcessorKind {
        /// Dotted path of the processor entry.
        path: String,
        /// The unrecognized kind.
        kind: String,
        /// Optional "did you mean" suggestion.
        hint: Hint,
    },

    /// A processor references an exporter name absent from the exporter mapping.
    #[error("span processor references undeclared exporter `{name}` at {path}")]
    UnknownExporterReference {
        /// Dotted path of the `args.exporter` field.
        path: String,
        /// The exporter name that could not be found.
        name: String,
    },

    /// An exporter declares a type with no registered constructor.
    #[error("unsupported exporter type `{kind}` at {path}{hint}")]
    UnsupportedExporterType {
        /// Dotted path of the exporter entry.
        path: String,
        /// The unrecognized type.
        kind: String,
        /// Optional "did you mean" suggestion.
        hint: Hint,
    },

    /// An exporter type is supported but the requested protocol is not.
    #[error("unsupported protocol `{protocol}` for exporter at {path}{hint}")]
    UnsupportedProtocol {
        /// Dotted path of the `protocol` field.
        path: String,
        /// The unrecognized protocol.
        protocol: String,
        /// Optional "did you mean" suggestion.
        hint: Hint,
    },

    /// The tracer provider names a sampler with no registered constructor.
    #[error("unsupported sampler `{name}` at {path}{hint}")]
    UnsupportedSampler {
        /// Dotted path of the sampler field.
        path: String,
        /// The unrecognized sampler name.
        name: String,
        /// Optional "did you mean" suggestion.
        hint: Hint,
    },

    /// A supported sampler is missing a setting it cannot run without.
    #[error("sampler `{name}` requires {path}")]
    IncompleteSampler {
        /// Dotted path of the missing setting.
        path: String,
        /// The sampler that needs it.
        name: String,
    },

    /// The propagator list contains an unrecognized name.
    #[error("unsupported propagator `{name}` at {path}{hint}")]
    UnsupportedPropagator {
        /// Dotted path of the propagator entry.
        path: String,
        /// The unrecognized propagator name.
        name: String,
        /// Optional "did you mean" suggestion.
        hint: Hint,
    },

    /// A registered exporter constructor rejected its configuration.
    #[error("failed to construct exporter at {path}: {message}")]
    ExporterConstruction {
        /// Dotted path of the exporter entry.
        path: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Another `apply` call is still running.
    #[error("a configuration is already being applied")]
    ApplyInProgress,

    /// A tracer provider has already been installed as the process-wide provider.
    #[error("a process-wide tracer provider has already been installed")]
    GlobalProviderInstalled,

    /// Flushing or shutting down the tracer provider reported an error.
    #[error("shutdown failed: {0}")]
    Shutdown(String),

    /// Flushing did not complete within the configured bound.
    #[error("shutdown did not complete within {0:?}")]
    ShutdownTimedOut(Duration),
}

/// A "did you mean" suggestion attached to an unsupported-name error.
///
/// Displays as an empty string when there is no suggestion, so it can be
/// appended directly to an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hint(pub Option<String>);

impl Hint {
    /// Returns the suggested name, if any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(name) => write!(f, " (did you mean `{name}`?)"),
            None => Ok(()),
        }
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
