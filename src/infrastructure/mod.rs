//! Infrastructure layer for environment interactions.
//!
//! Provides the path settings surrounding tooling uses to locate the schema
//! file and the repository root.

pub mod paths;

pub use paths::{get_repo_dir, get_schema_file, REPO_DIR_VAR, SCHEMA_FILE_VAR};
