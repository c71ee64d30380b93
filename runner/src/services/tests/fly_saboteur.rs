//! Fly.io saboteur against a mock Machines API

use std::collections::BTreeMap;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::error::ProviderError;
use crate::services::FlySaboteur;
use crate::traits::Saboteur;

const TOKEN: &str = "test-token";

async fn saboteur_for(server: &MockServer) -> FlySaboteur {
    FlySaboteur::new(TOKEN, format!("{}/v1/", server.uri())).unwrap()
}

fn machines_body() -> serde_json::Value {
    json!([
        {
            "id": "m-1",
            "name": "web-1",
            "state": "started",
            "region": "ams",
            "config": { "metadata": { "role": "web", "tier": "blue" } }
        },
        {
            "id": "m-2",
            "name": "web-2",
            "state": "stopped",
            "region": "ams",
            "config": { "metadata": { "role": "web" } }
        },
        {
            "id": "m-3",
            "name": "worker-1",
            "state": "running",
            "region": "fra",
            "config": { "metadata": { "role": "worker" } }
        },
        {
            "id": "m-4",
            "name": "bare",
            "state": "started",
            "region": "fra",
            "config": {}
        }
    ])
}

async fn mount_machines(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/apps/web/machines"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(machines_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_base_url_trailing_slash_is_trimmed() {
    let saboteur = FlySaboteur::new(TOKEN, "https://api.example.test/v1/").unwrap();
    assert_eq!(saboteur.base_url(), "https://api.example.test/v1");
}

#[tokio::test]
async fn test_invalid_base_url_is_rejected() {
    assert!(matches!(
        FlySaboteur::new(TOKEN, "not a url"),
        Err(ProviderError::Client { .. })
    ));
    assert!(matches!(
        FlySaboteur::new(TOKEN, "mailto:ops@example.test"),
        Err(ProviderError::Client { .. })
    ));
}

#[tokio::test]
async fn test_list_targets_keeps_only_running_machines() {
    let server = MockServer::start().await;
    mount_machines(&server).await;
    let saboteur = saboteur_for(&server).await;

    let targets = saboteur.list_targets("web", &BTreeMap::new()).await.unwrap();

    let ids: Vec<&str> = targets.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["m-1", "m-3", "m-4"]);
    assert_eq!(targets[0].name, "web-1");
    assert_eq!(targets[0].region, "ams");
    assert_eq!(targets[0].metadata.get("tier").map(String::as_str), Some("blue"));
    assert!(targets[2].metadata.is_empty());
}

#[tokio::test]
async fn test_list_targets_applies_metadata_selector() {
    let server = MockServer::start().await;
    mount_machines(&server).await;
    let saboteur = saboteur_for(&server).await;

    let selector = BTreeMap::from([("role".to_string(), "web".to_string())]);
    let targets = saboteur.list_targets("web", &selector).await.unwrap();

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].id, "m-1");
}

#[tokio::test]
async fn test_list_targets_empty_is_no_eligible_targets() {
    let server = MockServer::start().await;
    mount_machines(&server).await;
    let saboteur = saboteur_for(&server).await;

    let selector = BTreeMap::from([("role".to_string(), "db".to_string())]);
    let err = saboteur.list_targets("web", &selector).await.unwrap_err();

    assert!(matches!(err, ProviderError::NoEligibleTargets { ref app } if app == "web"));
}

#[tokio::test]
async fn test_list_targets_error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/web/machines"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;
    let saboteur = saboteur_for(&server).await;

    let err = saboteur.list_targets("web", &BTreeMap::new()).await.unwrap_err();

    match err {
        ProviderError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "unauthorized");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_list_targets_malformed_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/apps/web/machines"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let saboteur = saboteur_for(&server).await;

    let err = saboteur.list_targets("web", &BTreeMap::new()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Decode { .. }));
}

#[tokio::test]
async fn test_list_targets_unreachable_is_transport_error() {
    let saboteur = FlySaboteur::new(TOKEN, "http://127.0.0.1:1/v1").unwrap();

    let err = saboteur.list_targets("web", &BTreeMap::new()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport { .. }));
}

#[tokio::test]
async fn test_restart_accepts_ok_and_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/web/machines/m-1/restart"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/web/machines/m-2/restart"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;
    let saboteur = saboteur_for(&server).await;

    saboteur.restart_target("web", "m-1").await.unwrap();
    saboteur.restart_target("web", "m-2").await.unwrap();
}

#[tokio::test]
async fn test_restart_failure_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/web/machines/m-9/restart"))
        .respond_with(ResponseTemplate::new(404).set_body_string("machine not found"))
        .mount(&server)
        .await;
    let saboteur = saboteur_for(&server).await;

    let err = saboteur.restart_target("web", "m-9").await.unwrap_err();

    assert_eq!(
        err,
        ProviderError::UnexpectedStatus {
            status: 404,
            body: "machine not found".to_string(),
        }
    );
}

#[tokio::test]
async fn test_restart_encodes_target_id_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/apps/web/machines/m-1%2F..%2Fevil%3Fx/restart"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let saboteur = saboteur_for(&server).await;

    saboteur.restart_target("web", "m-1/../evil?x").await.unwrap();
}
