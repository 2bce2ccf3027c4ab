//! Entry point composing validation, assembly and lifecycle binding.
//!
//! ```text
//! schema + document ─► SchemaValidator ─► findings ─┬─ Warn: log, continue
//!                                                   └─ Strict: SchemaViolation
//!                  ─► ConfigDocument ─► PipelineAssembler ─► LifecycleBinder
//!                  ─► (install_global?) ─► BoundPipeline
//! ```
//!
//! One `apply` runs at a time per process. Calls from other threads wait for
//! the running one to finish; a call made from inside a running `apply` on
//! the same thread (for example from a console sink factory) fails with
//! [`ConfigError::ApplyInProgress`].

use crate::domain::error::{ConfigError, Result};
use crate::domain::{load_value, ConfigDocument, DocumentFormat};
use crate::pipeline::{BoundPipeline, LifecycleBinder, PipelineAssembler};
use crate::registry::ComponentRegistry;
use crate::schema::{load_schema, SchemaValidator, ValidationFinding};
use serde_json::Value;
use std::cell::Cell;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// What to do with schema findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Log each finding at `warn` and assemble anyway.
    #[default]
    Warn,
    /// Refuse to assemble when there is any finding.
    Strict,
}

/// Options for [`ConfigurationFacade`].
///
/// # Examples
///
/// ```
/// use otel_fileconfig::{ApplyOptions, ValidationPolicy};
/// use std::time::Duration;
///
/// let options = ApplyOptions::default()
///     .with_validation(ValidationPolicy::Strict)
///     .with_shutdown_timeout(Duration::from_secs(2));
///
/// assert!(!options.install_global);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub validation: ValidationPolicy,
    /// Make the assembled provider the process-wide one.
    pub install_global: bool,
    /// Upper bound on flush + shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::default(),
            install_global: false,
            shutdown_timeout: LifecycleBinder::DEFAULT_TIMEOUT,
        }
    }
}

impl ApplyOptions {
    #[must_use]
    pub const fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    #[must_use]
    pub const fn with_install_global(mut self, install_global: bool) -> Self {
        self.install_global = install_global;
        self
    }

    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

/// Validates a document, assembles it and binds its lifecycle.
///
/// # Examples
///
/// ```
/// use otel_fileconfig::{ApplyOptions, ConfigurationFacade};
/// use serde_json::json;
///
/// let schema = json!({"type": "object", "required": ["sdk"]});
/// let document = json!({"sdk": {"resource": {"attributes": {"service.name": "demo"}}}});
///
/// let bound = ConfigurationFacade::new(ApplyOptions::default()).apply(&schema, &document)?;
/// assert_eq!(bound.processor_count(), 0);
/// bound.shutdown()?;
/// # Ok::<(), otel_fileconfig::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigurationFacade<'r> {
    registry: &'r ComponentRegistry,
    options: ApplyOptions,
}

impl ConfigurationFacade<'static> {
    /// Creates a facade backed by [`ComponentRegistry::global`].
    #[must_use]
    pub fn new(options: ApplyOptions) -> Self {
        Self::with_registry(ComponentRegistry::global(), options)
    }
}

impl<'r> ConfigurationFacade<'r> {
    #[must_use]
    pub const fn with_registry(registry: &'r ComponentRegistry, options: ApplyOptions) -> Self {
        Self { registry, options }
    }

    #[must_use]
    pub const fn options(&self) -> &ApplyOptions {
        &self.options
    }

    /// Applies a document that has already been parsed into a value tree.
    ///
    /// # Errors
    ///
    /// The first error from schema compilation, strict validation, document
    /// deserialization, assembly or global installation. On error nothing
    /// stays installed and every constructed component is released.
    pub fn apply(&self, schema: &Value, document: &Value) -> Result<BoundPipeline> {
        let _guard = ApplyGuard::acquire()?;

        let span = tracing::debug_span!(
            "apply_configuration",
            policy = ?self.options.validation,
            install_global = self.options.install_global
        );
        let _enter = span.enter();

        let findings = SchemaValidator::new(schema)?.validate(document);
        self.check_findings(&findings)?;

        let document = ConfigDocument::from_value(document)?;
        let pipeline = PipelineAssembler::new(self.registry).assemble(&document)?;
        let bound = LifecycleBinder::new(self.options.shutdown_timeout)
            .bind(pipeline)
            .with_findings(findings);

        if self.options.install_global {
            bound.install_global()?;
        }

        tracing::debug!(
            processors = bound.processor_count(),
            findings = bound.findings().len(),
            "configuration applied"
        );
        Ok(bound)
    }

    /// Parses `text` in the given format and applies it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MalformedDocument`] if `text` does not parse, otherwise
    /// as [`apply`](Self::apply).
    pub fn apply_str(
        &self,
        schema: &Value,
        text: &str,
        format: DocumentFormat,
    ) -> Result<BoundPipeline> {
        let document = format.parse(text)?;
        self.apply(schema, &document)
    }

    /// Loads a schema file and a configuration file, then applies them.
    ///
    /// The configuration format follows the file extension.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if either file cannot be read, otherwise as
    /// [`apply`](Self::apply).
    pub fn apply_files(&self, schema_path: &Path, config_path: &Path) -> Result<BoundPipeline> {
        let schema = load_schema(schema_path)?;
        let document = load_value(config_path)?;
        self.apply(&schema, &document)
    }

    fn check_findings(&self, findings: &[ValidationFinding]) -> Result<()> {
        if findings.is_empty() {
            return Ok(());
        }
        match self.options.validation {
            ValidationPolicy::Strict => Err(ConfigError::SchemaViolation {
                findings: findings.to_vec(),
            }),
            ValidationPolicy::Warn => {
                for finding in findings {
                    tracing::warn!(
                        path = %finding.path,
                        message = %finding.message,
                        "configuration does not match schema"
                    );
                }
                Ok(())
            }
        }
    }
}

static APPLY_LOCK: Mutex<()> = Mutex::new(());

thread_local! {
    static APPLYING: Cell<bool> = const { Cell::new(false) };
}

/// Held for the duration of one `apply`.
struct ApplyGuard {
    _lock: MutexGuard<'static, ()>,
}

impl ApplyGuard {
    fn acquire() -> Result<Self> {
        if APPLYING.with(Cell::get) {
            return Err(ConfigError::ApplyInProgress);
        }
        // A panic inside a previous apply leaves no state behind worth protecting.
        let lock = APPLY_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        APPLYING.with(|flag| flag.set(true));
        Ok(Self { _lock: lock })
    }
}

impl Drop for ApplyGuard {
    fn drop(&mut self) {
        APPLYING.with(|flag| flag.set(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "sdk": {
                    "type": "object",
                    "properties": {"disabled": {"type": "boolean"}}
                }
            }
        })
    }

    #[test]
    fn warn_policy_keeps_findings_on_the_result() {
        let facade = ConfigurationFacade::new(ApplyOptions::default());
        let bound = facade
            .apply(&json!({"type": "object", "required": ["file_format"]}), &json!({"sdk": {}}))
            .unwrap();

        assert_eq!(bound.findings().len(), 1);
        assert_eq!(bound.findings()[0].path, "");
        assert!(bound.tracer_provider().is_some());
    }

    #[test]
    fn warn_policy_still_fails_on_shape_errors() {
        let err = ConfigurationFacade::new(ApplyOptions::default())
            .apply(&schema(), &json!({"sdk": {"disabled": "yes"}}))
            .unwrap_err();

        assert!(matches!(err, ConfigError::MalformedDocument(_)));
    }

    #[test]
    fn strict_policy_rejects_before_assembly() {
        let facade = ConfigurationFacade::new(
            ApplyOptions::default().with_validation(ValidationPolicy::Strict),
        );
        let err = facade
            .apply(&schema(), &json!({"sdk": {"disabled": "yes"}}))
            .unwrap_err();

        match err {
            ConfigError::SchemaViolation { findings } => {
                assert_eq!(findings.len(), 1);
                assert_eq!(findings[0].path, "/sdk/disabled");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn guard_rejects_reentry_on_the_same_thread() {
        let outer = ApplyGuard::acquire().unwrap();
        assert!(matches!(ApplyGuard::acquire(), Err(ConfigError::ApplyInProgress)));
        drop(outer);
        assert!(ApplyGuard::acquire().is_ok());
    }
}
