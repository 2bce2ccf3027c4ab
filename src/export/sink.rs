//! Line-oriented output targets for the JSON-lines exporters.

use std::io::{self, Write};
use std::sync::Arc;

/// A destination that accepts one serialized batch per line.
///
/// Implementations must be safe to call from the SDK's export threads.
pub trait LineSink: Send + Sync {
    /// Writes `line` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the line could not be written.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Writes lines to the process's standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()
    }
}

/// Produces the sink a console exporter writes to, given the exporter's name.
///
/// The default factory hands every console exporter the same [`StdoutSink`].
/// Tests and embedders can substitute their own through
/// [`ComponentRegistry::with_console_sink`](crate::ComponentRegistry::with_console_sink).
pub type ConsoleSinkFactory = Arc<dyn Fn(&str) -> Arc<dyn LineSink> + Send + Sync>;

/// The factory used when none is configured.
#[must_use]
pub fn stdout_factory() -> ConsoleSinkFactory {
    Arc::new(|_name: &str| Arc::new(StdoutSink) as Arc<dyn LineSink>)
}
