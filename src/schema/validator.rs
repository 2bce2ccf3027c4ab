use crate::domain::error::{ConfigError, Result};
use jsonschema::{Draft, Validator};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    /// JSON pointer into the document (`""` for the root).
    pub path: String,
    /// Description of the violated constraint.
    pub message: String,
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// A compiled Draft-06 schema.
///
/// Compiling is the expensive part; keep one validator around to check many
/// documents against the same schema.
pub struct SchemaValidator {
    inner: Validator,
}

impl SchemaValidator {
    /// Compiles a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSchema`] if the schema is not a valid
    /// Draft-06 schema.
    pub fn new(schema: &Value) -> Result<Self> {
        let inner = jsonschema::options()
            .with_draft(Draft::Draft6)
            .should_validate_formats(false)
            .build(schema)
            .map_err(|e| ConfigError::InvalidSchema(e.to_string()))?;

        Ok(Self { inner })
    }

    /// Checks a document and returns every finding, sorted by path.
    ///
    /// Pure: the document is not modified and nothing is logged.
    #[must_use]
    pub fn validate(&self, document: &Value) -> Vec<ValidationFinding> {
        let mut findings: Vec<ValidationFinding> = self
            .inner
            .iter_errors(document)
            .map(|e| ValidationFinding {
                path: e.instance_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        findings.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.message.cmp(&b.message)));
        findings
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("draft", &"draft-06")
            .finish_non_exhaustive()
    }
}

/// Compiles `schema` and checks `document` against it in one call.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidSchema`] if the schema does not compile.
pub fn validate(schema: &Value, document: &Value) -> Result<Vec<ValidationFinding>> {
    Ok(SchemaValidator::new(schema)?.validate(document))
}

/// Reads a schema file from disk.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::InvalidSchema`] if it is not JSON.
pub fn load_schema(path: &Path) -> Result<Value> {
    tracing::debug!(path = ?path, "loading schema");
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| ConfigError::InvalidSchema(format!("{}: {e}", path.display())))
}
