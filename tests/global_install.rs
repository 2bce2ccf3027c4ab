//! Process-wide installation. Kept in its own test binary because the global
//! provider can only be set once per process.

mod common;

use common::{schema, Recorder};
use opentelemetry::global;
use opentelemetry::propagation::TextMapPropagator as _;
use opentelemetry::trace::Tracer;
use otel_fileconfig::{ApplyOptions, ConfigError, ConfigurationFacade};
use serde_json::json;

#[test]
fn installs_provider_and_propagators_once_per_process() {
    let recorder = Recorder::new();
    let registry = recorder.registry();
    let document = json!({"sdk": {
        "propagators": ["tracecontext", "baggage"],
        "tracer_provider": {
            "exporters": {"console": {}},
            "span_processors": [{"name": "simple", "args": {"exporter": "console"}}]
        }
    }});
    let facade = ConfigurationFacade::with_registry(
        &registry,
        ApplyOptions::default().with_install_global(true),
    );

    let bound = facade.apply(&schema(), &document).unwrap();

    global::tracer("global-test").in_span("via-global", |_cx| {});
    assert_eq!(
        recorder.spans(),
        vec![("console".to_string(), "via-global".to_string())]
    );

    let fields: Vec<String> =
        global::get_text_map_propagator(|propagator| propagator.fields().map(str::to_string).collect());
    assert!(fields.iter().any(|f| f == "traceparent"));
    assert!(fields.iter().any(|f| f == "baggage"));

    let err = facade.apply(&schema(), &document).unwrap_err();
    assert!(matches!(err, ConfigError::GlobalProviderInstalled));
    assert!(matches!(bound.install_global(), Err(ConfigError::GlobalProviderInstalled)));

    bound.shutdown().unwrap();
}
