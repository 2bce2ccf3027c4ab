mod common;

use common::{schema, Recorder};
use opentelemetry::trace::{TraceContextExt as _, Tracer, TracerProvider as _};
use opentelemetry::KeyValue;
use otel_fileconfig::{
    ApplyOptions, ConfigError, ConfigurationFacade, DocumentFormat, ExporterTarget, OtlpProtocol,
    ProcessorKind, ValidationPolicy,
};
use serde_json::{json, Value};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn single_simple_console_processor() {
    let recorder = Recorder::new();
    let registry = recorder.registry();
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"e1": {"type": "console"}},
        "span_processors": [{"name": "simple", "args": {"exporter": "e1"}}]
    }}});

    let bound = ConfigurationFacade::with_registry(&registry, ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();

    assert_eq!(bound.processor_count(), 1);
    let summary = &bound.pipeline().processors()[0];
    assert_eq!(summary.kind, ProcessorKind::Simple);
    assert_eq!(summary.target, ExporterTarget::Console);
    assert!(bound.findings().is_empty());

    let tracer = bound.tracer_provider().unwrap().tracer("apply-test");
    tracer.in_span("checkout", |_cx| {});

    assert_eq!(recorder.spans(), vec![("e1".to_string(), "checkout".to_string())]);
    bound.shutdown().unwrap();
}

#[test]
fn processors_observe_spans_in_declaration_order() {
    let recorder = Recorder::new();
    let registry = recorder.registry();
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"second": {"type": "console"}, "first": {"type": "console"}},
        "span_processors": [
            {"name": "simple", "args": {"exporter": "first"}},
            {"name": "simple", "args": {"exporter": "second"}}
        ]
    }}});

    let bound = ConfigurationFacade::with_registry(&registry, ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();
    let tracer = bound.tracer_provider().unwrap().tracer("order");
    tracer.in_span("a", |_cx| {});
    tracer.in_span("b", |_cx| {});

    let pair = |e: &str, s: &str| (e.to_string(), s.to_string());
    assert_eq!(
        recorder.spans(),
        vec![
            pair("first", "a"),
            pair("second", "a"),
            pair("first", "b"),
            pair("second", "b"),
        ]
    );
}

#[test]
fn missing_exporter_reference_names_its_path() {
    let document = json!({"sdk": {"tracer_provider": {
        "span_processors": [{"name": "batch", "args": {"exporter": "missing"}}]
    }}});

    let err = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap_err();

    match err {
        ConfigError::UnknownExporterReference { path, name } => {
            assert_eq!(path, "sdk.tracer_provider.span_processors[0].args.exporter");
            assert_eq!(name, "missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn grpc_protocol_is_unsupported() {
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"collector": {"type": "otlp", "protocol": "grpc"}},
        "span_processors": [{"name": "batch", "args": {"exporter": "collector"}}]
    }}});

    let err = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::UnsupportedProtocol { ref path, ref protocol, .. }
            if path == "sdk.tracer_provider.exporters.collector.protocol" && protocol == "grpc"
    ));
}

#[test]
fn unsupported_names_suggest_a_registered_one() {
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"out": {"type": "consol"}},
        "span_processors": [{"name": "simple", "args": {"exporter": "out"}}]
    }}});

    let err = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unsupported exporter type `consol` at sdk.tracer_provider.exporters.out.type (did you mean `console`?)"
    );
}

#[test]
fn otlp_exporters_are_built_without_connecting() {
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {
            "otlp": {"endpoint": "http://127.0.0.1:9/v1/traces", "timeout": 100, "headers": {"api-key": 1234}},
            "json": {"type": "otlp", "protocol": "http/json", "compression": "gzip"}
        },
        "span_processors": [
            {"name": "batch", "args": {"exporter": "otlp", "schedule_delay": 60000}},
            {"name": "batch", "args": {"exporter": "json", "max_queue_size": 16, "max_export_batch_size": 8}}
        ]
    }}});

    let bound = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();

    let targets: Vec<ExporterTarget> = bound
        .pipeline()
        .processors()
        .iter()
        .map(|p| p.target)
        .collect();
    assert_eq!(
        targets,
        vec![
            ExporterTarget::Otlp(OtlpProtocol::HttpProtobuf),
            ExporterTarget::Otlp(OtlpProtocol::HttpJson),
        ]
    );
    bound.shutdown().unwrap();
}

#[test]
fn simple_otlp_export_outside_a_runtime_reports_instead_of_panicking() {
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"collector": {"type": "otlp", "endpoint": "http://127.0.0.1:9/v1/traces", "timeout": 500}},
        "span_processors": [{"name": "simple", "args": {"exporter": "collector"}}]
    }}});

    let bound = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();

    let tracer = bound.tracer_provider().unwrap().tracer("otlp-simple");
    tracer.in_span("unreachable-collector", |_cx| {});
    tracer.in_span("still-running", |_cx| {});

    bound.shutdown().unwrap();
}

struct CountedSink {
    dropped: Arc<AtomicUsize>,
}

impl otel_fileconfig::LineSink for CountedSink {
    fn write_line(&self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for CountedSink {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn failed_assembly_releases_exporters_already_constructed() {
    let created = Arc::new(AtomicUsize::new(0));
    let dropped = Arc::new(AtomicUsize::new(0));
    let (created_in, dropped_in) = (Arc::clone(&created), Arc::clone(&dropped));
    let registry = otel_fileconfig::ComponentRegistry::new().with_console_sink(move |_name| {
        created_in.fetch_add(1, Ordering::SeqCst);
        Arc::new(CountedSink {
            dropped: Arc::clone(&dropped_in),
        }) as Arc<dyn otel_fileconfig::LineSink>
    });
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"console": {}},
        "span_processors": [
            {"name": "batch", "args": {"exporter": "console", "schedule_delay": 60000}},
            {"name": "batch", "args": {"exporter": "missing"}}
        ]
    }}});

    let facade = ConfigurationFacade::with_registry(&registry, ApplyOptions::default());
    for _ in 0..3 {
        let err = facade.apply(&schema(), &document).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownExporterReference { .. }));
    }

    assert_eq!(created.load(Ordering::SeqCst), 3);
    assert_eq!(dropped.load(Ordering::SeqCst), 3);
}

#[test]
fn always_off_sampler_exports_nothing() {
    let recorder = Recorder::new();
    let registry = recorder.registry();
    let document = json!({"sdk": {"tracer_provider": {
        "sampler": "always_off",
        "exporters": {"console": {}},
        "span_processors": [{"name": "simple", "args": {"exporter": "console"}}]
    }}});

    let bound = ConfigurationFacade::with_registry(&registry, ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();
    bound
        .tracer_provider()
        .unwrap()
        .tracer("sampled")
        .in_span("dropped-by-sampler", |_cx| {});
    bound.shutdown().unwrap();

    assert!(recorder.spans().is_empty());
}

#[test]
fn span_limits_cap_recorded_attributes() {
    let recorder = Recorder::new();
    let registry = recorder.registry();
    let document = json!({"sdk": {"tracer_provider": {
        "span_limits": {"attribute_count_limit": 1},
        "exporters": {"console": {}},
        "span_processors": [{"name": "simple", "args": {"exporter": "console"}}]
    }}});

    let bound = ConfigurationFacade::with_registry(&registry, ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();
    bound
        .tracer_provider()
        .unwrap()
        .tracer("limits")
        .in_span("limited", |cx| {
            let span = cx.span();
            span.set_attribute(KeyValue::new("kept", 1));
            span.set_attribute(KeyValue::new("over-1", 2));
            span.set_attribute(KeyValue::new("over-2", 3));
        });

    let lines = recorder.lines();
    assert_eq!(lines.len(), 1);
    let batch: Value = serde_json::from_str(&lines[0]).unwrap();
    let span = &batch["resourceSpans"][0]["scopeSpans"][0]["spans"][0];
    let attributes = span["attributes"].as_array().unwrap();
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes[0]["key"], "kept");
    assert_eq!(span["droppedAttributesCount"], 2);
}

#[test]
fn absent_tracer_provider_yields_no_processors() {
    let document = json!({"sdk": {"resource": {"attributes": {"service.name": "idle"}}}});

    let bound = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();

    assert_eq!(bound.processor_count(), 0);
    assert!(bound.tracer_provider().is_some());
}

#[test]
fn strict_policy_promotes_findings() {
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"e1": {"type": "console", "insecure": true}},
        "span_processors": [{"name": "simple", "args": {"exporter": "e1"}}]
    }}});

    let err = ConfigurationFacade::new(
        ApplyOptions::default().with_validation(ValidationPolicy::Strict),
    )
    .apply(&schema(), &document)
    .unwrap_err();
    match err {
        ConfigError::SchemaViolation { findings } => {
            assert_eq!(findings.len(), 1);
            assert_eq!(findings[0].path, "/sdk/tracer_provider/exporters/e1");
        }
        other => panic!("unexpected error: {other}"),
    }

    let bound = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();
    assert_eq!(bound.processor_count(), 1);
    assert_eq!(bound.findings().len(), 1);
}

#[test]
fn yaml_documents_apply() {
    let recorder = Recorder::new();
    let registry = recorder.registry();
    let text = r"
sdk:
  resource:
    attributes:
      service.name: yaml-service
  tracer_provider:
    exporters:
      console: {}
    span_processors:
      - kind: simple
        args:
          exporter: console
";

    let bound = ConfigurationFacade::with_registry(&registry, ApplyOptions::default())
        .apply_str(&schema(), text, DocumentFormat::Yaml)
        .unwrap();
    bound.tracer_provider().unwrap().tracer("yaml").in_span("loaded", |_cx| {});

    let lines = recorder.spans();
    assert_eq!(lines, vec![("console".to_string(), "loaded".to_string())]);
}

#[test]
fn malformed_text_fails_before_validation() {
    let err = ConfigurationFacade::new(ApplyOptions::default())
        .apply_str(&schema(), "sdk: [unclosed", DocumentFormat::Yaml)
        .unwrap_err();

    assert!(matches!(err, ConfigError::MalformedDocument(_)));
}

#[test]
fn disabled_sdk_applies_to_nothing() {
    let bound = ConfigurationFacade::new(ApplyOptions::default())
        .apply(&schema(), &json!({"sdk": {"disabled": true}}))
        .unwrap();

    assert!(bound.tracer_provider().is_none());
    assert_eq!(bound.processor_count(), 0);
}

#[test]
fn reentrant_apply_is_rejected() {
    let inner_result: Arc<Mutex<Option<String>>> = Arc::default();
    let slot = Arc::clone(&inner_result);
    let registry = otel_fileconfig::ComponentRegistry::new().with_console_sink(move |_name| {
        let nested = ConfigurationFacade::new(ApplyOptions::default())
            .apply(&json!({}), &json!({"sdk": {}}));
        *slot.lock().unwrap() = Some(match nested {
            Ok(_) => "ok".to_string(),
            Err(e) => e.to_string(),
        });
        Arc::new(otel_fileconfig::StdoutSink) as Arc<dyn otel_fileconfig::LineSink>
    });
    let document = json!({"sdk": {"tracer_provider": {
        "exporters": {"console": {}},
        "span_processors": [{"name": "simple", "args": {"exporter": "console"}}]
    }}});

    let bound = ConfigurationFacade::with_registry(&registry, ApplyOptions::default())
        .apply(&schema(), &document)
        .unwrap();

    assert_eq!(bound.processor_count(), 1);
    assert_eq!(
        inner_result.lock().unwrap().as_deref(),
        Some("a configuration is already being applied")
    );
}
