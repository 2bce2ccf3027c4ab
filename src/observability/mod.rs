//! Process-local `tracing` setup for the binary.
//!
//! The library itself only emits `tracing` events and spans; installing a
//! subscriber is left to the process. This module is what the
//! `otel-fileconfig` binary uses, and embedders can reuse it:
//!
//! ```text
//! tracing macros → EnvFilter → fmt layer (stderr)
//!                            → OpenTelemetryLayer → assembled TracerProvider
//! ```
//!
//! # Configuration
//!
//! Level is controlled via:
//! 1. `RUST_LOG` environment variable (highest priority)
//! 2. the level passed by the caller (the binary's `--log-level`)

mod init;

pub use init::{bootstrap_subscriber, init_tracing, INSTRUMENTATION_NAME};
