//! JSON-schema validation of configuration documents.
//!
//! Documents are checked against a published schema before assembly. The
//! validator speaks **Draft-06**: type checks, `required`, `enum`, `pattern`
//! and the other structural keywords are enforced, while `format` is treated
//! as an annotation only. Picking one dialect matters because dialects
//! disagree on edge cases; Draft-06 matches the schema files this format was
//! first published with.
//!
//! Validation never fails on a bad *document*: it returns the list of
//! [`ValidationFinding`]s, empty when the document is valid. Only a bad
//! *schema* is an error.
//!
//! # Example
//!
//! ```
//! use otel_fileconfig::schema::SchemaValidator;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["sdk"],
//!     "properties": {"sdk": {"type": "object"}}
//! });
//! let validator = SchemaValidator::new(&schema)?;
//!
//! assert!(validator.validate(&json!({"sdk": {}})).is_empty());
//!
//! let findings = validator.validate(&json!({"sdk": 3}));
//! assert_eq!(findings.len(), 1);
//! assert_eq!(findings[0].path, "/sdk");
//! # Ok::<(), otel_fileconfig::ConfigError>(())
//! ```

mod validator;

pub use validator::{load_schema, validate, SchemaValidator, ValidationFinding};
