#![allow(clippy::unwrap_used)]
// Reconciliation scenarios against a wiremock engine.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use placeos_core::{
    CoreError, Driver, DriverFields, DriverRole, LifecycleState, Managed, Module, ModuleFields,
    Outcome, Provider, ProviderConfig, RetryPolicy, Zone, ZoneFields,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Provider) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 7200,
            "refresh_token": "ref-1",
            "created_at": 1_626_781_157
        })))
        .mount(&server)
        .await;

    let mut config = ProviderConfig::new(
        Url::parse(&server.uri()).unwrap(),
        "support@place.tech",
        SecretString::from("development".to_string()),
        "app-id",
        SecretString::from("app-secret".to_string()),
    );
    config.timeout = Duration::from_secs(5);
    config.retry = RetryPolicy {
        max_retries: 2,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    };

    let provider = Provider::connect(&config).await.unwrap();
    (server, provider)
}

fn api_path(suffix: &str) -> String {
    format!("/api/engine/v2/{suffix}")
}

fn driver_json() -> serde_json::Value {
    json!({
        "id": "driver-1",
        "created_at": 1_626_781_157,
        "updated_at": 1_626_781_157,
        "name": "Lutron",
        "description": "",
        "file_name": "drivers/lutron/lighting.cr",
        "default_uri": null,
        "commit": "abc123",
        "role": 1,
        "module_name": "Lighting",
        "repository_id": "repo-1",
        "ignore_connected": false
    })
}

// ── Create / round-trip ─────────────────────────────────────────────

#[tokio::test]
async fn test_absent_entity_is_created_and_reads_back() {
    let (server, provider) = setup().await;

    let created = json!({
        "id": "zone-l2",
        "created_at": 1_626_781_157,
        "updated_at": 1_626_781_157,
        "name": "Level 2",
        "tags": ["level"],
        "capacity": 120
    });

    Mock::given(method("POST"))
        .and(path(api_path("zones")))
        .and(body_json(json!({"name": "Level 2", "tags": ["level"], "capacity": 120})))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("zones/zone-l2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(created))
        .mount(&server)
        .await;

    let desired = ZoneFields {
        name: Some("Level 2".into()),
        tags: Some(vec!["level".into()]),
        capacity: Some(120),
        ..ZoneFields::default()
    };

    let reconciler = provider.reconciler::<Zone>();
    let mut managed = Managed::<Zone>::absent();
    let outcome = reconciler.reconcile(&mut managed, &desired).await.unwrap();
    assert_eq!(outcome, Outcome::Created);
    assert_eq!(managed.state(), LifecycleState::Created);
    assert_eq!(managed.id(), Some("zone-l2"));

    let zone = provider.entities::<Zone>().read("zone-l2").await.unwrap();
    assert!(!zone.id.is_empty());
    assert!(zone.created_at.is_some());
    assert_eq!(
        placeos_core::changed_fields::<Zone>(&desired, &zone).unwrap(),
        placeos_core::FieldSet::new()
    );
}

// ── Idempotence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_unchanged_config_reads_once_and_never_writes() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("drivers/driver-1")))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(driver_json()))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let desired = DriverFields {
        name: Some("Lutron".into()),
        commit: Some("abc123".into()),
        role: Some(DriverRole::Device),
        ..DriverFields::default()
    };

    let reconciler = provider.reconciler::<Driver>();
    let mut managed = Managed::<Driver>::existing("driver-1");
    for _ in 0..2 {
        let outcome = reconciler.reconcile(&mut managed, &desired).await.unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(managed.state(), LifecycleState::Synced);
    }
}

// ── Update shapes ───────────────────────────────────────────────────

#[tokio::test]
async fn test_full_replace_kind_sends_every_settable_field() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("drivers/driver-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(driver_json()))
        .expect(1)
        .mount(&server)
        .await;

    let mut updated = driver_json();
    updated["commit"] = json!("def456");

    Mock::given(method("PUT"))
        .and(path(api_path("drivers/driver-1")))
        .and(body_json(json!({
            "name": "Lutron",
            "description": "",
            "file_name": "drivers/lutron/lighting.cr",
            "commit": "def456",
            "role": 1,
            "module_name": "Lighting",
            "repository_id": "repo-1",
            "ignore_connected": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .expect(1)
        .mount(&server)
        .await;

    let desired = DriverFields {
        commit: Some("def456".into()),
        ..DriverFields::default()
    };

    let mut managed = Managed::<Driver>::existing("driver-1");
    let outcome = provider
        .reconciler::<Driver>()
        .reconcile(&mut managed, &desired)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Updated {
            changed: ["commit".to_owned()].into_iter().collect()
        }
    );
    assert_eq!(managed.state(), LifecycleState::Updated);
    assert_eq!(
        managed.snapshot().and_then(|d| d.commit.as_deref()),
        Some("def456")
    );
}

#[tokio::test]
async fn test_partial_kind_sends_only_changed_fields() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("modules/mod-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "mod-1",
            "ip": "10.0.0.20",
            "port": 23,
            "tls": false,
            "driver_id": "driver-1",
            "connected": true,
            "running": true,
            "role": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(api_path("modules/mod-1")))
        .and(body_json(json!({"port": 4999})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "mod-1",
            "ip": "10.0.0.20",
            "port": 4999
        })))
        .expect(1)
        .mount(&server)
        .await;

    let desired = ModuleFields {
        ip: Some("10.0.0.20".into()),
        port: Some(4999),
        driver_id: Some("driver-1".into()),
        ..ModuleFields::default()
    };

    let mut managed = Managed::<Module>::existing("mod-1");
    let outcome = provider
        .reconciler::<Module>()
        .reconcile(&mut managed, &desired)
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Updated { ref changed } if changed.len() == 1));
}

#[tokio::test]
async fn test_vanished_entity_is_not_recreated() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("zones/zone-gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(api_path("zones")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut managed = Managed::<Zone>::existing("zone-gone");
    let result = provider
        .reconciler::<Zone>()
        .reconcile(&mut managed, &ZoneFields::default())
        .await;
    assert!(matches!(result, Err(CoreError::NotFound { kind: "zone", .. })));
}

#[tokio::test]
async fn test_rejected_update_is_reported_verbatim() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("modules/mod-1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "mod-1", "port": 23})))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path(api_path("modules/mod-1")))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"port": ["must be positive"]})),
        )
        .mount(&server)
        .await;

    let mut managed = Managed::<Module>::existing("mod-1");
    let result = provider
        .reconciler::<Module>()
        .reconcile(
            &mut managed,
            &ModuleFields {
                port: Some(0),
                ..ModuleFields::default()
            },
        )
        .await;

    match result {
        Err(CoreError::Validation { status, message }) => {
            assert_eq!(status, 422);
            assert!(message.contains("must be positive"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
    assert_eq!(managed.state(), LifecycleState::Synced);
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_destroy_then_read_is_not_found() {
    let (server, provider) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(api_path("zones/zone-l2")))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("zones/zone-l2")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let reconciler = provider.reconciler::<Zone>();
    let mut managed = Managed::<Zone>::existing("zone-l2");
    reconciler.destroy(&mut managed).await.unwrap();
    assert_eq!(managed.state(), LifecycleState::Deleted);
    assert!(managed.id().is_none());

    let result = reconciler.observe("zone-l2").await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_destroy_of_vanished_entity_still_marks_deleted() {
    let (server, provider) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(api_path("zones/zone-gone")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut managed = Managed::<Zone>::existing("zone-gone");
    let result = provider.reconciler::<Zone>().destroy(&mut managed).await;
    assert!(result.unwrap_err().is_not_found());
    assert_eq!(managed.state(), LifecycleState::Deleted);
}

// ── Retry asymmetry ─────────────────────────────────────────────────

#[tokio::test]
async fn test_transient_read_failure_is_retried() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path(api_path("zones/zone-1")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(api_path("zones/zone-1")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "zone-1", "name": "Level 1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut managed = Managed::<Zone>::existing("zone-1");
    let outcome = provider
        .reconciler::<Zone>()
        .reconcile(
            &mut managed,
            &ZoneFields {
                name: Some("Level 1".into()),
                ..ZoneFields::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
}

#[tokio::test]
async fn test_create_is_never_retried() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path(api_path("zones")))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut managed = Managed::<Zone>::absent();
    let result = provider
        .reconciler::<Zone>()
        .reconcile(
            &mut managed,
            &ZoneFields {
                name: Some("Level 3".into()),
                ..ZoneFields::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::Api { status: 503, .. })));
    assert_eq!(managed.state(), LifecycleState::Absent);
}
