//! Configuration document data model.
//!
//! These types mirror the configuration file format: a root `sdk` section with a
//! `resource` block and an optional `tracer_provider` block. They are plain
//! serde records with no behaviour beyond parsing; every symbolic name they hold
//! (`name`, `type`, `protocol`, `sampler`) stays a `String` here and is resolved
//! into a closed enum by the [`registry`](crate::registry) during assembly.
//!
//! Documents can be written as JSON, YAML or TOML. All three are first
//! normalised into a [`serde_json::Value`] so that schema validation and typed
//! deserialization see exactly the same tree.
//!
//! # Format
//!
//! ```yaml
//! sdk:
//!   resource:
//!     attributes:
//!       service.name: checkout
//!   tracer_provider:
//!     exporters:
//!       console: {}
//!       collector:
//!         type: otlp
//!         protocol: http/protobuf
//!         endpoint: http://localhost:4318/v1/traces
//!         timeout: 10000
//!     span_processors:
//!       - name: simple
//!         args:
//!           exporter: console
//!       - name: batch
//!         args:
//!           exporter: collector
//!           max_queue_size: 2048
//! ```

use crate::domain::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Text formats a configuration document can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Picks a format from a file extension.
    ///
    /// Returns `None` for unrecognized or missing extensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use otel_fileconfig::DocumentFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(DocumentFormat::from_path(Path::new("otel.yml")), Some(DocumentFormat::Yaml));
    /// assert_eq!(DocumentFormat::from_path(Path::new("otel.ini")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Parses text in this format into a JSON value tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedDocument`] if the text is not valid in
    /// this format.
    pub fn parse(self, text: &str) -> Result<Value> {
        let parsed = match self {
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| ConfigError::MalformedDocument(format!("{self} input: {e}")))
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        })
    }
}

/// Reads a document file and normalises it into a JSON value tree.
///
/// The format is chosen from the file extension; unknown extensions are read
/// as YAML, which is a superset of JSON.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::MalformedDocument`] if it cannot be parsed.
pub fn load_value(path: &Path) -> Result<Value> {
    tracing::debug!(path = ?path, "loading configuration document");
    let text = std::fs::read_to_string(path)?;
    let format = DocumentFormat::from_path(path).unwrap_or(DocumentFormat::Yaml);
    format.parse(&text)
}

/// A scalar attribute or header value.
///
/// Resource attributes may be strings, integers, floats or booleans. Header
/// values are stringified through [`Display`](fmt::Display), which lets
/// documents write `api-key: 1234` without quoting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&ScalarValue> for opentelemetry::Value {
    fn from(value: &ScalarValue) -> Self {
        match value {
            ScalarValue::Bool(b) => Self::Bool(*b),
            ScalarValue::Int(i) => Self::I64(*i),
            ScalarValue::Float(x) => Self::F64(*x),
            ScalarValue::String(s) => Self::String(s.clone().into()),
        }
    }
}

/// The root of a parsed configuration document.
///
/// Read-only after parsing: the assembler only ever borrows it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Version tag of the file format, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_version: Option<ScalarValue>,

    /// SDK configuration.
    #[serde(default)]
    pub sdk: SdkConfig,
}

impl ConfigDocument {
    /// Deserializes a document from an already-parsed value tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedDocument`] if the tree does not match the
    /// data model (for example a string where a list of processors is expected).
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| ConfigError::MalformedDocument(e.to_string()))
    }

    /// Parses and deserializes a document from text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedDocument`] if the text cannot be parsed
    /// or does not match the data model.
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self> {
        Self::from_value(&format.parse(text)?)
    }
}

/// The `sdk` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Disables the SDK entirely: nothing is assembled or installed.
    #[serde(default)]
    pub disabled: bool,

    /// Resource attributes attached to every span.
    #[serde(default)]
    pub resource: ResourceConfig,

    /// Text-map propagators, in the order they should run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub propagators: Vec<String>,

    /// Tracer provider pipeline. Absent means a no-op provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracer_provider: Option<TracerProviderConfig>,
}

/// The `sdk.resource` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub attributes: BTreeMap<String, ScalarValue>,
}

/// The `sdk.tracer_provider` section.
///
/// Every exporter name referenced by a processor must be a key of
/// [`exporters`](Self::exporters). The schema cannot express that constraint,
/// so it is checked during assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TracerProviderConfig {
    /// Exporters by name.
    #[serde(default)]
    pub exporters: BTreeMap<String, ExporterConfig>,

    /// Span processors in attachment order.
    #[serde(default)]
    pub span_processors: Vec<SpanProcessorConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_limits: Option<SpanLimitsConfig>,

    /// Sampler name (`always_on`, `always_off`, `trace_id_ratio_based`, `parent_based`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampler_config: Option<SamplerConfig>,
}

/// One entry of `span_processors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanProcessorConfig {
    /// Processor kind (`batch` or `simple`).
    #[serde(alias = "kind")]
    pub name: String,

    pub args: ProcessorArgs,
}

/// The `args` record of a span processor.
///
/// Durations are integer milliseconds. Unset tuning fields keep the SDK's
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorArgs {
    /// Name of the exporter this processor feeds.
    pub exporter: String,

    #[serde(default, alias = "scheduled_delay_millis", skip_serializing_if = "Option::is_none")]
    pub schedule_delay: Option<u64>,

    #[serde(default, alias = "export_timeout_millis", skip_serializing_if = "Option::is_none")]
    pub export_timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_queue_size: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_export_batch_size: Option<usize>,
}

/// One entry of `exporters`.
///
/// When `type` is omitted the exporter's key in the mapping is used as its
/// type, so `exporters: { console: {} }` declares a console exporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Wire protocol for network exporters. Defaults to `http/protobuf`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,

    /// Collector URL, used verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, ScalarValue>,

    /// Export timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Accepted for compatibility; the HTTP exporter does not compress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,

    /// Output file for the `file` exporter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl ExporterConfig {
    /// Returns the declared type, falling back to the exporter's name.
    #[must_use]
    pub fn kind_or<'a>(&'a self, name: &'a str) -> &'a str {
        self.kind.as_deref().unwrap_or(name)
    }
}

/// The `span_limits` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanLimitsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_count_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_value_length_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_count_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_count_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_attribute_count_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_attribute_count_limit: Option<u32>,
}

/// The `sampler_config` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id_ratio_based: Option<RatioSamplerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_based: Option<ParentBasedSamplerConfig>,
}

/// Arguments of the `trace_id_ratio_based` sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioSamplerConfig {
    pub ratio: f64,
}

/// Arguments of the `parent_based` sampler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentBasedSamplerConfig {
    /// Sampler for root spans. Defaults to `always_on`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_and_json_normalise_to_the_same_tree() {
        let yaml = "sdk:\n  resource:\n    attributes:\n      service.name: demo\n";
        let json = r#"{"sdk":{"resource":{"attributes":{"service.name":"demo"}}}}"#;

        assert_eq!(
            DocumentFormat::Yaml.parse(yaml).unwrap(),
            DocumentFormat::Json.parse(json).unwrap()
        );
    }

    #[test]
    fn toml_documents_parse() {
        let text = "[sdk.tracer_provider.exporters.console]\n\n[[sdk.tracer_provider.span_processors]]\nname = \"simple\"\nargs = { exporter = \"console\" }\n";
        let doc = ConfigDocument::parse(text, DocumentFormat::Toml).unwrap();

        let provider = doc.sdk.tracer_provider.unwrap();
        assert!(provider.exporters.contains_key("console"));
        assert_eq!(provider.span_processors[0].args.exporter, "console");
    }

    #[test]
    fn processor_kind_accepts_kind_alias() {
        let json = r#"{"sdk":{"tracer_provider":{"span_processors":[{"kind":"batch","args":{"exporter":"e"}}]}}}"#;
        let doc = ConfigDocument::parse(json, DocumentFormat::Json).unwrap();

        assert_eq!(doc.sdk.tracer_provider.unwrap().span_processors[0].name, "batch");
    }

    #[test]
    fn exporter_type_falls_back_to_name() {
        let exporter = ExporterConfig::default();
        assert_eq!(exporter.kind_or("console"), "console");

        let typed = ExporterConfig {
            kind: Some("otlp".to_string()),
            ..Default::default()
        };
        assert_eq!(typed.kind_or("collector"), "otlp");
    }

    #[test]
    fn scalar_headers_stringify() {
        let json = r#"{"api-key": 1234, "debug": true, "tenant": "a"}"#;
        let headers: BTreeMap<String, ScalarValue> = serde_json::from_str(json).unwrap();

        let rendered: Vec<String> = headers.values().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["1234", "true", "a"]);
    }

    #[test]
    fn syntax_errors_are_malformed_documents() {
        let err = DocumentFormat::Json.parse("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument(_)));
    }

    #[test]
    fn shape_errors_are_malformed_documents() {
        let value = serde_json::json!({"sdk": {"tracer_provider": {"span_processors": "batch"}}});
        let err = ConfigDocument::from_value(&value).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument(_)));
    }
}
