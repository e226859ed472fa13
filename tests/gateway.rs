//! End-to-end routing through a running gateway.

mod common;

use std::time::Duration;

use cmdb_gateway::config::FallbackRouteConfig;
use common::{client, config_with_upstreams, start_echo_backend, start_gateway};
use serde_json::Value;

#[tokio::test]
async fn test_legacy_update_is_rewritten_and_body_preserved() {
    let topo = start_echo_backend("topo").await;
    let gateway = start_gateway(config_with_upstreams(&[("topo", topo)])).await;

    let body = r#"{"bk_obj_id":"host","bk_inst_id":7,"bk_host_name":"db-1"}"#;
    let response = client()
        .put(gateway.url("/api/v3/cc/update_inst/"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let echo: Value = response.json().await.unwrap();
    assert_eq!(echo["backend"], "topo");
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["uri"], "/topo/v3/update/instance/object/host/inst/7");
    assert_eq!(echo["body"], body);
}

#[tokio::test]
async fn test_domain_route_keeps_query() {
    let host = start_echo_backend("host").await;
    let gateway = start_gateway(config_with_upstreams(&[("host", host)])).await;

    let response = client().get(gateway.url("/api/v3/hosts/search?page=1")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let echo: Value = response.json().await.unwrap();
    assert_eq!(echo["backend"], "host");
    assert_eq!(echo["uri"], "/host/v3/hosts/search?page=1");
}

#[tokio::test]
async fn test_host_prefix_is_replaced() {
    let host = start_echo_backend("host").await;
    let gateway = start_gateway(config_with_upstreams(&[("host", host)])).await;

    let response = client()
        .post(gateway.url("/api/v3/host/findmany/x"))
        .body("{}")
        .send()
        .await
        .unwrap();

    let echo: Value = response.json().await.unwrap();
    assert_eq!(echo["uri"], "/host/v3/findmany/x");
    assert_eq!(echo["body"], "{}");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let gateway = start_gateway(config_with_upstreams(&[])).await;

    let response = client().get(gateway.url("/api/v3/unknown/zzz")).send().await.unwrap();
    assert_eq!(response.status(), 404);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error["result"], false);
    assert_eq!(error["message"], "unknown requested with backend process: /api/v3/unknown/zzz");
}

#[tokio::test]
async fn test_legacy_without_body_is_bad_request() {
    let topo = start_echo_backend("topo").await;
    let gateway = start_gateway(config_with_upstreams(&[("topo", topo)])).await;

    let response = client()
        .post(gateway.url("/api/v3/cc/create_inst/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error["message"], "request body cannot be empty");
}

#[tokio::test]
async fn test_missing_upstream_is_unavailable() {
    let gateway = start_gateway(config_with_upstreams(&[])).await;

    let response = client().get(gateway.url("/api/v3/findmany/proc/x")).send().await.unwrap();
    assert_eq!(response.status(), 503);
}

#[tokio::test]
async fn test_oversize_body_is_rejected() {
    let host = start_echo_backend("host").await;
    let mut config = config_with_upstreams(&[("host", host)]);
    config.limits.max_body_bytes = 16;
    let gateway = start_gateway(config).await;

    let response = client()
        .post(gateway.url("/api/v3/hosts/search"))
        .body(vec![b'x'; 64])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_fallback_route_claims_unknown_prefix() {
    let extension = start_echo_backend("extension").await;
    let mut config = config_with_upstreams(&[("extension", extension)]);
    config.fallback_routes.push(FallbackRouteConfig {
        name: "extension".into(),
        path_prefix: "/api/v3/extension/".into(),
        backend: "extension".into(),
        rewrite_from: Some("/api/v3/extension".into()),
        rewrite_to: Some("/extension/v3".into()),
    });
    let gateway = start_gateway(config).await;

    let echo: Value = client()
        .get(gateway.url("/api/v3/extension/widgets"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echo["backend"], "extension");
    assert_eq!(echo["uri"], "/extension/v3/widgets");
}

#[tokio::test]
async fn test_reload_swaps_upstreams() {
    let gateway = start_gateway(config_with_upstreams(&[])).await;
    let url = gateway.url("/api/v3/event/subscribe/search");

    assert_eq!(client().get(&url).send().await.unwrap().status(), 503);

    let event = start_echo_backend("event").await;
    gateway.updates.send(config_with_upstreams(&[("event", event)])).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let echo: Value = client().get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(echo["backend"], "event");
    assert_eq!(echo["uri"], "/event/v3/subscribe/search");
}

#[tokio::test]
async fn test_legacy_identifier_with_reserved_characters() {
    let topo = start_echo_backend("topo").await;
    let gateway = start_gateway(config_with_upstreams(&[("topo", topo)])).await;

    for (id, uri) in [
        ("a?b=1", "/topo/v3/create/instance/object/a%3Fb%3D1"),
        ("my obj", "/topo/v3/create/instance/object/my%20obj"),
    ] {
        let response = client()
            .post(gateway.url("/api/v3/cc/create_inst/"))
            .body(serde_json::json!({ "bk_obj_id": id }).to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "{id}");

        let echo: Value = response.json().await.unwrap();
        assert_eq!(echo["uri"], uri);
    }
}
