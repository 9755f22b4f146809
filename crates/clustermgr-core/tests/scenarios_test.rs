#![allow(clippy::unwrap_used)]
// End-to-end behaviour of the typed layer against a wiremock server.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::Instant;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clustermgr_core::{
    ApiBatchRequestElement, ApiRoot, ConfigMap, ConnectionConfig, DEFAULT_POLL_INTERVAL, Error,
    ErrorKind, Method, WaitOptions,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> ConnectionConfig {
    let addr = server.address();
    ConnectionConfig::new(addr.ip().to_string()).port(addr.port())
}

async fn setup() -> (MockServer, ApiRoot) {
    let server = MockServer::start().await;
    let root = ApiRoot::connect(&config_for(&server)).unwrap();
    (server, root)
}

async fn mount_cluster(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v19/clusters/c1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "c1", "version": "CDH5"})),
        )
        .mount(server)
        .await;
}

// ── Clusters ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_cluster_round_trip() {
    let (server, root) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v19/clusters"))
        .and(body_json(json!({"items": [{"name": "c1", "version": "CDH5"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "name": "c1",
                "version": "CDH5",
                "maintenanceMode": false,
                "maintenanceOwners": []
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cluster = root.create_cluster("c1", "CDH5", None).await.unwrap();
    assert_eq!(cluster.name(), Some("c1"));
    assert_eq!(cluster.version(), Some("CDH5"));
    assert_eq!(cluster.maintenance_mode(), Some(false));

    let err = cluster.set("maintenanceMode", true).unwrap_err();
    assert!(matches!(err, Error::ReadOnlyAttribute { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_and_wait_for_command() {
    let (server, root) = setup().await;
    mount_cluster(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v19/clusters/c1/commands/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 42, "name": "Start", "active": true})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v19/commands/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 42, "name": "Start", "active": true})),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v19/commands/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"id": 42, "name": "Start", "active": false, "success": true}),
        ))
        .with_priority(2)
        .mount(&server)
        .await;

    let cluster = root.get_cluster("c1").await.unwrap();
    let cmd = cluster.start().await.unwrap();
    assert!(cmd.is_active());

    let interval = Duration::from_millis(200);
    let started = Instant::now();
    let done = cmd
        .wait_with(WaitOptions::timeout(Duration::from_secs(30)).poll_interval(interval))
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(!done.is_active());
    assert_eq!(done.success(), Some(true));
    assert_eq!(done.id(), Some(42));
    assert!(elapsed >= interval, "waited {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "waited {elapsed:?}");
}

#[tokio::test]
async fn test_wait_polls_at_default_cadence() {
    let (server, root) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v19/commands/11"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 11, "active": true})),
        )
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v19/commands/11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"id": 11, "active": false, "success": true}),
        ))
        .with_priority(2)
        .mount(&server)
        .await;

    let cmd = root.get_command(11).await.unwrap();
    assert!(cmd.is_active());

    let started = Instant::now();
    let done = cmd.wait(Some(Duration::from_secs(30))).await.unwrap();
    let elapsed = started.elapsed();

    assert!(!done.is_active());
    assert_eq!(done.success(), Some(true));
    assert!(elapsed >= DEFAULT_POLL_INTERVAL, "waited {elapsed:?}");
    assert!(
        elapsed < DEFAULT_POLL_INTERVAL * 2,
        "polled more than once: {elapsed:?}"
    );
}

#[tokio::test]
async fn test_wait_with_zero_timeout_fetches_once() {
    let (server, root) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v19/commands/7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 7, "active": true})),
        )
        .expect(2)
        .mount(&server)
        .await;

    let cmd = root.get_command(7).await.unwrap();
    let latest = cmd.wait(Some(Duration::ZERO)).await.unwrap();
    assert!(latest.is_active());
}

#[tokio::test]
async fn test_wait_propagates_transport_failure() {
    let (server, root) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v19/commands/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9, "active": true})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v19/commands/9"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"message": "Command 9 not found"})),
        )
        .with_priority(2)
        .mount(&server)
        .await;

    let cmd = root.get_command(9).await.unwrap();
    let opts = WaitOptions::timeout(Duration::from_secs(30))
        .poll_interval(Duration::from_millis(100));
    let err = cmd.wait_with(opts).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.api_message(), Some("Command 9 not found"));
}

#[tokio::test]
async fn test_abort_posts_to_command() {
    let (server, root) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v19/commands/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "active": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v19/commands/5/abort"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"id": 5, "active": false, "success": false, "resultMessage": "Aborted"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let cmd = root.get_command(5).await.unwrap();
    let aborted = cmd.abort().await.unwrap();
    assert_eq!(aborted.result_message(), Some("Aborted"));
}

#[tokio::test]
async fn test_dropped_root_detaches_entities() {
    let (server, root) = setup().await;
    mount_cluster(&server).await;

    let cluster = root.get_cluster("c1").await.unwrap();
    drop(root);

    let err = cluster.start().await.unwrap_err();
    assert!(matches!(err, Error::Detached { .. }));
}

// ── Version gate ────────────────────────────────────────────────────

#[tokio::test]
async fn test_version_gate_blocks_before_io() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let root = ApiRoot::connect(&config_for(&server).version(1)).unwrap();
    let err = root.get_cluster_hosts("c1").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    let msg = err.to_string();
    assert!(msg.contains('1') && msg.contains('3'), "{msg}");
    assert!(msg.contains("get_cluster_hosts"), "{msg}");
}

// ── Batch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_batch_reports_failed_element() {
    let (server, root) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v19/batch"))
        .and(body_json(json!({
            "items": [
                {"method": "GET", "url": "/api/v19/clusters/c1"},
                {
                    "method": "PUT",
                    "url": "/api/v19/clusters/c1",
                    "body": {"displayName": "x"},
                    "contentType": "application/json"
                }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "items": [{"statusCode": 200}, {"statusCode": 400}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let elements = [
        ApiBatchRequestElement::new(&Method::GET, "/api/v19/clusters/c1"),
        ApiBatchRequestElement::new(&Method::PUT, "/api/v19/clusters/c1")
            .body(json!({"displayName": "x"})),
    ];
    let response = root.do_batch(&elements).await.unwrap();

    assert!(!response.success());
    let items = response.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].status_code(), Some(200));

    let failures = response.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, 1);
    assert_eq!(failures[0].1.status_code(), Some(400));
}

// ── Config ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_config_round_trip() {
    let (server, root) = setup().await;
    let envelope = json!({"items": [{"name": "k", "value": "v"}]});

    Mock::given(method("PUT"))
        .and(path("/api/v19/cm/config"))
        .and(body_json(envelope.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope))
        .expect(1)
        .mount(&server)
        .await;

    let mut map = ConfigMap::new();
    map.insert("k".into(), Some("v".into()));
    let echoed = root.update_cm_config(&map).await.unwrap();
    assert_eq!(echoed, map);
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn test_wrong_credentials_surface_auth_error() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("www-authenticate", "Basic realm=\"Cluster Manager\""),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).credentials("admin", "wrong");
    let root = ApiRoot::connect(&config).unwrap();
    let err = root.get_all_clusters(None).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(err.is_auth_failure());
    assert!(!matches!(err, Error::Api { .. } | Error::Http { .. }));
    assert!(!err.to_string().contains("wrong"));
}
