//! Environment-driven path settings.
//!
//! These are read by tooling around the interpreter (the CLI, test harnesses),
//! never by the interpreter itself, which always takes explicit paths or
//! values.

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable naming the JSON schema file.
pub const SCHEMA_FILE_VAR: &str = "SCHEMA_FILE";

/// Environment variable naming the repository root.
pub const REPO_DIR_VAR: &str = "REPO_DIR";

/// Returns the repository root.
///
/// Uses `REPO_DIR` when set and non-empty, otherwise the directory this crate
/// was built from.
///
/// # Examples
///
/// ```
/// use otel_fileconfig::infrastructure::get_repo_dir;
///
/// assert!(get_repo_dir().is_absolute());
/// ```
#[must_use]
pub fn get_repo_dir() -> PathBuf {
    resolve(std::env::var_os(REPO_DIR_VAR), || {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    })
}

/// Returns the schema file path.
///
/// Uses `SCHEMA_FILE` when set and non-empty, otherwise
/// `<repo>/schema/schema.json`.
///
/// # Examples
///
/// ```
/// use otel_fileconfig::infrastructure::get_schema_file;
///
/// let schema = get_schema_file();
/// assert_eq!(schema.extension().and_then(|e| e.to_str()), Some("json"));
/// ```
#[must_use]
pub fn get_schema_file() -> PathBuf {
    resolve(std::env::var_os(SCHEMA_FILE_VAR), || {
        get_repo_dir().join("schema").join("schema.json")
    })
}

fn resolve(value: Option<OsString>, fallback: impl FnOnce() -> PathBuf) -> PathBuf {
    match value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => fallback(),
    }
}
