//! End-to-end resolver tests against wiremock registries.
//!
//! Request counts on each mock server double as call counters: a mock with
//! `.expect(0)` fails the test on drop if the resolver contacted it.

use std::time::Duration;

use iglu_client::http::REQUEST_TIMEOUT;
use iglu_client::{
    ClientError, EmbeddedSource, HttpSource, Resolver, SchemaSource, SourceDescriptor,
    SourceOutcome, BOOTSTRAP_NAME,
};
use iglu_core::SchemaKey;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENT_KEY: &str = "iglu:com.acme/event/jsonschema/1-0-0";
const EVENT_PATH: &str = "/schemas/com/acme/event/jsonschema/1-0-0";

fn key() -> SchemaKey {
    SchemaKey::parse(EVENT_KEY).unwrap()
}

fn event_schema() -> Value {
    json!({
        "$schema": "http://iglucentral.com/schemas/com.snowplowanalytics.self-desc/schema/jsonschema/1-0-0#",
        "self": {
            "vendor": "com.acme",
            "name": "event",
            "format": "jsonschema",
            "version": "1-0-0"
        },
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "amount": {"type": "integer", "minimum": 0}
        },
        "required": ["id"],
        "additionalProperties": false
    })
}

/// HTTP registry without retries, so each lookup is one request.
fn http(name: &str, priority: i64, prefixes: &[&str], server: &MockServer) -> SchemaSource {
    let descriptor = SourceDescriptor::new(
        name,
        priority,
        prefixes.iter().map(|p| p.to_string()).collect(),
    );
    HttpSource::new(descriptor, &server.uri())
        .unwrap()
        .with_max_retries(0)
        .into()
}

async fn serve(server: &MockServer, schema: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(EVENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema))
        .expect(times)
        .mount(server)
        .await;
}

async fn not_found(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path(EVENT_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn falls_back_from_not_found_to_next_registry() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;
    not_found(&a, 1).await;
    serve(&b, event_schema(), 1).await;

    let resolver = Resolver::new(vec![http("B", 2, &[], &b), http("A", 1, &[], &a)], None);
    let schema = resolver.lookup_schema(&key()).await.unwrap();
    assert_eq!(schema, event_schema());
}

#[tokio::test]
async fn later_registries_are_not_consulted_after_success() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;
    serve(&a, json!({"title": "a"}), 1).await;
    serve(&b, json!({"title": "b"}), 0).await;

    let resolver = Resolver::new(vec![http("A", 1, &[], &a), http("B", 2, &[], &b)], None);
    assert_eq!(resolver.lookup_schema(&key()).await.unwrap()["title"], "a");
}

#[tokio::test]
async fn exhaustion_reports_outcomes_in_order() {
    let a = MockServer::start().await;
    not_found(&a, 1).await;

    let resolver = Resolver::new(vec![http("Acme Registry", 1, &[], &a)], None);
    let err = resolver.lookup_schema(&key()).await.unwrap_err();

    assert_eq!(err.key, key());
    assert_eq!(
        err.outcomes,
        vec![
            SourceOutcome::NotFound {
                registry: BOOTSTRAP_NAME.into()
            },
            SourceOutcome::NotFound {
                registry: "Acme Registry".into()
            },
        ]
    );
}

#[tokio::test]
async fn cache_hit_avoids_registry_calls() {
    let server = MockServer::start().await;
    serve(&server, event_schema(), 1).await;

    let resolver = Resolver::new(vec![http("Acme", 1, &[], &server)], None);
    let first = resolver.lookup_schema(&key()).await.unwrap();
    let second = resolver.lookup_schema(&key()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(resolver.cached_count(), 1);
}

#[tokio::test]
async fn cache_hit_within_ttl() {
    let server = MockServer::start().await;
    serve(&server, event_schema(), 1).await;

    let resolver = Resolver::new(
        vec![http("Acme", 1, &[], &server)],
        Some(Duration::from_secs(3600)),
    );
    resolver.lookup_schema(&key()).await.unwrap();
    resolver.lookup_schema(&key()).await.unwrap();
}

#[tokio::test]
async fn expired_entry_triggers_fresh_lookup() {
    let server = MockServer::start().await;
    serve(&server, event_schema(), 2).await;

    // Every entry is at least zero seconds old, so a zero TTL always expires.
    let resolver = Resolver::new(vec![http("Acme", 1, &[], &server)], Some(Duration::ZERO));
    resolver.lookup_schema(&key()).await.unwrap();
    resolver.lookup_schema(&key()).await.unwrap();
}

#[tokio::test]
async fn failed_lookups_are_not_cached() {
    let server = MockServer::start().await;
    not_found(&server, 2).await;

    let resolver = Resolver::new(vec![http("Acme", 1, &[], &server)], None);
    assert!(resolver.lookup_schema(&key()).await.is_err());
    assert!(resolver.lookup_schema(&key()).await.is_err());
    assert_eq!(resolver.cached_count(), 0);
}

#[tokio::test]
async fn unreachable_registry_falls_back_to_next() {
    let good = MockServer::start().await;
    serve(&good, event_schema(), 1).await;

    let unreachable: SchemaSource = HttpSource::new(
        SourceDescriptor::new("Offline", 1, Vec::new()),
        "http://127.0.0.1:1",
    )
    .unwrap()
    .into();

    let resolver = Resolver::new(vec![unreachable, http("Good", 2, &[], &good)], None);
    assert_eq!(resolver.lookup_schema(&key()).await.unwrap(), event_schema());
}

#[tokio::test]
async fn unreachable_registry_is_recorded_as_failure() {
    let unreachable: SchemaSource = HttpSource::new(
        SourceDescriptor::new("Offline", 1, Vec::new()),
        "http://127.0.0.1:1",
    )
    .unwrap()
    .into();

    let resolver = Resolver::new(vec![unreachable], None);
    let err = resolver.lookup_schema(&key()).await.unwrap_err();
    assert_eq!(err.outcomes.len(), 2);
    match &err.outcomes[1] {
        SourceOutcome::LookupFailure { registry, reason } => {
            assert_eq!(registry, "Offline");
            assert!(!reason.is_empty());
        }
        other => panic!("expected lookup failure, got {other:?}"),
    }
}

async fn slow(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(EVENT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"title": "late"}))
                .set_delay(REQUEST_TIMEOUT + Duration::from_secs(2)),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn timed_out_registry_is_recorded_then_skipped() {
    let slow_server = MockServer::start().await;
    let good = MockServer::start().await;
    slow(&slow_server).await;
    not_found(&good, 1).await;

    // Default retries: a timeout must still cost exactly one request.
    let slow_source: SchemaSource = HttpSource::new(
        SourceDescriptor::new("Slow", 1, Vec::new()),
        &slow_server.uri(),
    )
    .unwrap()
    .into();
    let resolver = Resolver::new(vec![slow_source, http("Good", 2, &[], &good)], None);

    let err = resolver.lookup_schema(&key()).await.unwrap_err();
    assert_eq!(err.outcomes.len(), 3);
    match &err.outcomes[1] {
        SourceOutcome::LookupFailure { registry, reason } => {
            assert_eq!(registry, "Slow");
            assert!(reason.contains("timed out"), "{reason}");
        }
        other => panic!("expected lookup failure, got {other:?}"),
    }
    assert_eq!(
        err.outcomes[2],
        SourceOutcome::NotFound {
            registry: "Good".into()
        }
    );
}

#[tokio::test]
async fn timed_out_registry_falls_back_to_next() {
    let slow_server = MockServer::start().await;
    let good = MockServer::start().await;
    slow(&slow_server).await;
    serve(&good, event_schema(), 1).await;

    let resolver = Resolver::new(
        vec![http("Slow", 1, &[], &slow_server), http("Good", 2, &[], &good)],
        None,
    );
    assert_eq!(resolver.lookup_schema(&key()).await.unwrap(), event_schema());
}

#[tokio::test]
async fn embedded_registry_wins_within_equal_priority() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("schemas").join(key().canonical_path());
    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, r#"{"title": "embedded"}"#).unwrap();

    let server = MockServer::start().await;
    serve(&server, json!({"title": "http"}), 0).await;

    let embedded: SchemaSource =
        EmbeddedSource::new(SourceDescriptor::new("Disk", 5, Vec::new()), dir.path()).into();
    let resolver = Resolver::new(vec![http("Net", 5, &[], &server), embedded], None);

    assert_eq!(resolver.lookup_schema(&key()).await.unwrap()["title"], "embedded");
}

#[tokio::test]
async fn vendor_affinity_breaks_priority_ties() {
    let plain = MockServer::start().await;
    let affine = MockServer::start().await;
    serve(&plain, json!({"title": "plain"}), 0).await;
    serve(&affine, json!({"title": "affine"}), 1).await;

    let resolver = Resolver::new(
        vec![
            http("Plain", 3, &[], &plain),
            http("Affine", 3, &["com.acme"], &affine),
        ],
        None,
    );

    let order: Vec<&str> = resolver
        .resolution_order(&key())
        .iter()
        .map(|s| s.name())
        .collect();
    assert_eq!(order, [BOOTSTRAP_NAME, "Affine", "Plain"]);
    assert_eq!(resolver.lookup_schema(&key()).await.unwrap()["title"], "affine");
}

#[tokio::test]
async fn validate_accepts_conforming_instance() {
    let server = MockServer::start().await;
    serve(&server, event_schema(), 1).await;
    let resolver = Resolver::new(vec![http("Acme", 1, &[], &server)], None);

    resolver
        .validate(&json!({
            "schema": EVENT_KEY,
            "data": {"id": "evt-1", "amount": 42}
        }))
        .await
        .unwrap();
}

#[tokio::test]
async fn validate_reports_missing_required_field() {
    let server = MockServer::start().await;
    serve(&server, event_schema(), 1).await;
    let resolver = Resolver::new(vec![http("Acme", 1, &[], &server)], None);

    let err = resolver
        .validate(&json!({"schema": EVENT_KEY, "data": {"amount": 42}}))
        .await
        .unwrap_err();
    match err {
        ClientError::SchemaViolation(violations) => {
            assert_eq!(violations.key(), &key());
            assert!(
                violations.mentions("id"),
                "expected a violation naming 'id', got: {violations}"
            );
            assert!(violations
                .iter()
                .any(|v| v.keyword.as_deref() == Some("required")));
        }
        other => panic!("expected SchemaViolation, got: {other}"),
    }
}

#[tokio::test]
async fn validate_requires_self_describing_envelope() {
    let resolver = Resolver::new(Vec::new(), None);
    let err = resolver
        .validate(&json!({"data": {"id": "x"}}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Iglu(iglu_core::IgluError::NotSelfDescribing { missing: "schema" })
    ));
}

#[tokio::test]
async fn validate_surfaces_resolution_failure() {
    let server = MockServer::start().await;
    not_found(&server, 1).await;
    let resolver = Resolver::new(vec![http("Acme", 1, &[], &server)], None);

    let err = resolver
        .validate(&json!({"schema": EVENT_KEY, "data": {"id": "x"}}))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Resolver(_)));
}

#[tokio::test]
async fn is_valid_collapses_failures() {
    let server = MockServer::start().await;
    serve(&server, event_schema(), 1).await;
    let resolver = Resolver::new(vec![http("Acme", 1, &[], &server)], None);

    assert!(
        resolver
            .is_valid(&json!({"schema": EVENT_KEY, "data": {"id": "ok"}}))
            .await
    );
    assert!(
        !resolver
            .is_valid(&json!({"schema": EVENT_KEY, "data": {"id": 7}}))
            .await
    );
    assert!(!resolver.is_valid(&json!({"schema": "iglu:bad"})).await);
}
