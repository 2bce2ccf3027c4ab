#![allow(dead_code)]

use otel_fileconfig::{load_schema, ComponentRegistry, LineSink};
use serde_json::Value;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// The schema shipped with the crate.
pub fn schema() -> Value {
    load_schema(&Path::new(env!("CARGO_MANIFEST_DIR")).join("schema/schema.json")).unwrap()
}

/// Collects every line written by console exporters, tagged with the
/// exporter's name.
#[derive(Clone, Default)]
pub struct Recorder {
    lines: Arc<Mutex<Vec<(String, String)>>>,
}

struct RecordingSink {
    exporter: String,
    lines: Arc<Mutex<Vec<(String, String)>>>,
}

impl LineSink for RecordingSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap()
            .push((self.exporter.clone(), line.to_string()));
        Ok(())
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose console exporters write into this recorder.
    pub fn registry(&self) -> ComponentRegistry {
        let lines = Arc::clone(&self.lines);
        ComponentRegistry::new().with_console_sink(move |name| {
            Arc::new(RecordingSink {
                exporter: name.to_string(),
                lines: Arc::clone(&lines),
            }) as Arc<dyn LineSink>
        })
    }

    /// Raw lines in the order they were written.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, line)| line.clone())
            .collect()
    }

    /// `(exporter, span name)` pairs in the order they were exported.
    pub fn spans(&self) -> Vec<(String, String)> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(exporter, line)| {
                span_names(line)
                    .into_iter()
                    .map(move |name| (exporter.clone(), name))
            })
            .collect()
    }
}

/// Names of every span in one OTLP JSON line.
pub fn span_names(line: &str) -> Vec<String> {
    let batch: Value = serde_json::from_str(line).unwrap();
    batch["resourceSpans"]
        .as_array()
        .into_iter()
        .flatten()
        .flat_map(|rs| rs["scopeSpans"].as_array().cloned().unwrap_or_default())
        .flat_map(|ss| ss["spans"].as_array().cloned().unwrap_or_default())
        .filter_map(|span| span["name"].as_str().map(str::to_string))
        .collect()
}
