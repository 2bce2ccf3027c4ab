//! Command-line entry point.
//!
//! Loads a configuration document and a schema, applies them, and either
//! reports what would be built (`check`) or runs the pipeline long enough to
//! push one test span through it (`apply`).
//!
//! ```text
//! otel-fileconfig --config otel.yaml check
//! otel-fileconfig --config otel.yaml --strict --global apply
//! ```

#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use otel_fileconfig::infrastructure::{get_schema_file, SCHEMA_FILE_VAR};
use otel_fileconfig::observability::{bootstrap_subscriber, init_tracing};
use otel_fileconfig::{
    load_schema, load_value, ApplyOptions, ConfigurationFacade, SchemaValidator, ValidationPolicy,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "otel-fileconfig")]
#[command(about = "Validate and apply a declarative OpenTelemetry configuration", long_about = None)]
struct Cli {
    /// Configuration document (.json, .yaml, .yml or .toml)
    #[arg(short, long)]
    config: PathBuf,

    /// JSON schema the document is checked against
    #[arg(short, long, env = SCHEMA_FILE_VAR)]
    schema: Option<PathBuf>,

    /// Refuse to apply a document with schema findings
    #[arg(long)]
    strict: bool,

    /// Install the provider and propagators process-wide
    #[arg(long)]
    global: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Upper bound on flushing at shutdown, in milliseconds
    #[arg(long, default_value_t = 5000)]
    shutdown_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the document and print any findings
    Check,
    /// Apply the document, emit a test span and shut down
    Apply,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let schema_path = cli.schema.clone().unwrap_or_else(get_schema_file);

    let result = match cli.command {
        Commands::Check => check(&cli, &schema_path),
        Commands::Apply => apply(&cli, &schema_path),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn check(cli: &Cli, schema_path: &Path) -> otel_fileconfig::Result<ExitCode> {
    let schema = load_schema(schema_path)?;
    let document = load_value(&cli.config)?;
    let findings = SchemaValidator::new(&schema)?.validate(&document);

    if findings.is_empty() {
        println!("{}: valid", cli.config.display());
        return Ok(ExitCode::SUCCESS);
    }
    for finding in &findings {
        println!("{finding}");
    }
    Ok(if cli.strict {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn apply(cli: &Cli, schema_path: &Path) -> otel_fileconfig::Result<ExitCode> {
    let options = ApplyOptions::default()
        .with_validation(if cli.strict {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::Warn
        })
        .with_install_global(cli.global)
        .with_shutdown_timeout(Duration::from_millis(cli.shutdown_timeout_ms));

    let bound = tracing::subscriber::with_default(bootstrap_subscriber(&cli.log_level), || {
        ConfigurationFacade::new(options).apply_files(schema_path, &cli.config)
    })?;

    init_tracing(&cli.log_level, bound.tracer_provider());

    {
        let span = tracing::info_span!(
            "otel_fileconfig.smoke_test",
            config = %cli.config.display(),
            processors = bound.processor_count()
        );
        let _enter = span.enter();
        tracing::info!(
            findings = bound.findings().len(),
            "configuration applied"
        );
    }

    bound.shutdown()?;
    Ok(ExitCode::SUCCESS)
}
