//! End-to-end lifecycle of a port-forward rule against a mock appliance.

use pfsense_core::{ApiClient, Error, Resource, Session};
use pfsense_nat::{PortForwardResource, PortForwardSpec};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RULES: &str = "/firewall/nat/port_forward";

fn envelope(data: Value) -> Value {
    json!({
        "status": "ok",
        "code": 200,
        "return": 0,
        "message": "Success",
        "data": data
    })
}

fn https_rule() -> Value {
    json!({
        "interface": "wan",
        "protocol": "tcp",
        "source": {"any": ""},
        "destination": {"network": "wanip", "port": "443"},
        "target": "10.0.20.10",
        "local-port": "443"
    })
}

fn desired() -> PortForwardSpec {
    PortForwardSpec {
        interface: "wan".into(),
        protocol: "tcp".into(),
        src: "any".into(),
        dst: "wanip".into(),
        srcport: "any".into(),
        dstport: "443".into(),
        target: "10.0.20.10".into(),
        local_port: "443".into(),
    }
}

fn resource(server: &MockServer) -> PortForwardResource {
    let client = ApiClient::new(server.uri()).unwrap();
    PortForwardResource::new(&Session::new(client).with_settle_delay(Duration::ZERO))
}

#[tokio::test]
async fn test_create_returns_first_position() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RULES))
        .and(body_partial_json(json!({
            "interface": "wan",
            "target": "10.0.20.10",
            "local-port": "443",
            "top": true,
            "apply": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(https_rule())))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RULES))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([https_rule()]))))
        .mount(&server)
        .await;

    let state = resource(&server).create(&desired()).await.unwrap();
    assert_eq!(state.id, "wan/0");
    assert_eq!(state.record, desired());
}

#[tokio::test]
async fn test_create_without_match_reports_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RULES))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(https_rule())))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RULES))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    let err = resource(&server).create(&desired()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_delete_sends_single_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RULES))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([https_rule()]))))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(RULES))
        .and(body_json(json!({"id": 0, "apply": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
        .expect(1)
        .mount(&server)
        .await;

    resource(&server).delete("wan/0").await.unwrap();
}

fn http_rule() -> Value {
    json!({
        "interface": "wan",
        "protocol": "tcp",
        "source": {"any": ""},
        "destination": {"network": "wanip", "port": "80"},
        "target": "10.0.20.11",
        "local-port": "80"
    })
}

#[tokio::test]
async fn test_update_replaces_rule_and_relocates_it() {
    let server = MockServer::start().await;
    let before = envelope(json!({"0": http_rule(), "1": https_rule()}));
    let after = envelope(json!([https_rule(), http_rule()]));

    // Existence check sees the stale rule at position 1.
    Mock::given(method("GET"))
        .and(path(RULES))
        .respond_with(ResponseTemplate::new(200).set_body_json(before))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(RULES))
        .and(body_json(json!({"id": 1, "apply": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(RULES))
        .and(body_partial_json(json!({
            "target": "10.0.20.10",
            "top": true,
            "apply": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(https_rule())))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RULES))
        .respond_with(ResponseTemplate::new(200).set_body_json(after))
        .expect(2)
        .mount(&server)
        .await;

    let state = resource(&server).update("wan/1", &desired()).await.unwrap();
    assert_eq!(state.id, "wan/0");
    assert_eq!(state.record, desired());

    let methods: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.method.to_string())
        .collect();
    assert_eq!(methods, ["GET", "DELETE", "POST", "GET", "GET"]);
}

#[tokio::test]
async fn test_read_of_vanished_rule() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RULES))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(Value::Null)))
        .mount(&server)
        .await;

    let err = resource(&server).read("wan/0").await.unwrap_err();
    assert!(err.clears_identifier());
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RULES))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([https_rule()]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = pfsense_core::ApiClientBuilder::new(server.uri())
        .unwrap()
        .with_token("tok-123")
        .build()
        .unwrap();
    let resource = PortForwardResource::new(&Session::new(client));

    let state = resource.read("wan/0").await.unwrap();
    assert_eq!(state.record.dst, "wanip");
}
