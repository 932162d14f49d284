#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use logalert::alert::{AlertService, SearchBackend, ZabbixDefaults};
use logalert::api::{AppState, HealthProbe, build_router};
use logalert::config::BasicAuth;
use logalert::zbx_client::ZbxClient;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ops:s3cret
const OPS: &str = "Basic b3BzOnMzY3JldA==";

fn router(zabbix: &MockServer, search: &MockServer) -> Router {
    let zabbix_url = Url::parse(&zabbix.uri()).expect("zabbix url");
    let search_url = Url::parse(&search.uri()).expect("search url");
    let client = ZbxClient::new(
        zabbix_url.clone(),
        SecretString::from("token"),
        Duration::from_secs(2),
        Duration::from_secs(1),
        true,
    )
    .expect("client");
    let alerts = AlertService::new(
        client,
        SearchBackend {
            endpoint: search.uri(),
            username: "elastic".to_string(),
            password: SecretString::from("changeme"),
        },
        ZabbixDefaults {
            host_group_id: "2".to_string(),
            interface_port: "10050".to_string(),
            trigger_priority: 4,
        },
    );
    let health =
        HealthProbe::new(zabbix_url, search_url, Duration::from_secs(1), true).expect("probe");
    build_router(Arc::new(AppState {
        alerts,
        health,
        auth: BasicAuth {
            username: "ops".to_string(),
            password: SecretString::from("s3cret"),
        },
    }))
}

async fn mount(server: &MockServer, name: &str, result: Value) {
    Mock::given(method("POST"))
        .and(body_string_contains(format!(r#""method":"{name}""#)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "result": result,
            "id": 1
        })))
        .mount(server)
        .await;
}

async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json envelope"))
}

#[tokio::test]
async fn create_over_http_returns_ids() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;
    mount(&zabbix, "item.get", json!([])).await;
    mount(&zabbix, "host.get", json!([{"hostid": "10084", "host": "nginx-", "name": "nginx-"}])).await;
    mount(&zabbix, "item.create", json!({"itemids": ["28000"]})).await;
    mount(&zabbix, "trigger.create", json!({"triggerids": ["13579"]})).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/alert/create?name=err-5xx&index=nginx-*&query_string=status:5*")
        .header(header::AUTHORIZATION, OPS)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"delay":"3m","threshold":">=10"}"#))
        .unwrap();
    let (status, body) = call(router(&zabbix, &search), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["error"], "");
    assert_eq!(body["data"], json!({"itemID": "28000", "triggerID": "13579"}));

    let requests = zabbix.received_requests().await.expect("requests");
    let trigger: Value = requests
        .iter()
        .map(|req| serde_json::from_slice::<Value>(&req.body).expect("json"))
        .find(|req| req["method"] == "trigger.create")
        .expect("trigger.create sent");
    assert_eq!(trigger["params"]["priority"], "4");
}

#[tokio::test]
async fn legacy_create_path_is_served() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/alert/creat?name=err-5xx&index=nginx-*&query_string=status:5*")
        .header(header::AUTHORIZATION, OPS)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"delay":"never","threshold":">=10"}"#))
        .unwrap();
    let (status, body) = call(router(&zabbix, &search), req).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "failure");
    assert!(body["error"].as_str().unwrap().contains("delay"));
}

#[tokio::test]
async fn missing_body_is_unprocessable() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/alert/create?name=err-5xx&index=nginx-*&query_string=status:5*")
        .header(header::AUTHORIZATION, OPS)
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router(&zabbix, &search), req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn unauthenticated_requests_are_refused() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&zabbix)
        .await;

    let req = Request::builder()
        .uri("/api/v1/alert/query")
        .body(Body::empty())
        .unwrap();
    let response = router(&zabbix, &search).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        response.headers()[header::WWW_AUTHENTICATE]
            .to_str()
            .unwrap()
            .starts_with("Basic")
    );
}

#[tokio::test]
async fn query_over_http_lists_alerts() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;
    let posts = r#"{"query":{"bool":{"must":[{"query_string":{"query":"status:5*"}},{"range":{"@timestamp":{"format":"strict_date_optional_time","gte":"now-3m","lte":"now"}}}]}},"size":0}"#;
    mount(
        &zabbix,
        "item.get",
        json!([{
            "itemid": "28000",
            "hostid": "10084",
            "name": "err-5xx",
            "key_": "f35ad5edf2157b69ab60b6704732c743",
            "delay": "3m",
            "url": "http://es.example.com:9200/nginx-*/_search",
            "posts": posts,
            "description": ""
        }]),
    )
    .await;
    mount(
        &zabbix,
        "trigger.get",
        json!([{"triggerid": "13579", "expression": "{13579}>=10", "description": "err-5xx"}]),
    )
    .await;

    let req = Request::builder()
        .uri("/api/v1/alert/get?index=")
        .header(header::AUTHORIZATION, OPS)
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router(&zabbix, &search), req).await;

    assert_eq!(status, StatusCode::OK);
    let alerts = body["data"].as_array().expect("alert list");
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["query_string"], "status:5*");
    assert_eq!(alerts[0]["threshold"], ">=10");
    assert_eq!(alerts[0]["elasticsearch"], "http://es.example.com:9200");
}

#[tokio::test]
async fn delete_unknown_alert_is_not_found() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;
    mount(&zabbix, "item.get", json!([])).await;

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/v1/alert/delete?name=ghost")
        .header(header::AUTHORIZATION, OPS)
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router(&zabbix, &search), req).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn zabbix_failures_are_internal_errors() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&zabbix)
        .await;

    let req = Request::builder()
        .uri("/api/v1/alert/query")
        .header(header::AUTHORIZATION, OPS)
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router(&zabbix, &search), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "failure");
}

#[tokio::test]
async fn health_check_needs_no_credentials() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;

    let req = Request::builder()
        .uri("/api/v1/monitor/health_check")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router(&zabbix, &search), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn padded_fields_are_stored_trimmed() {
    let zabbix = MockServer::start().await;
    let search = MockServer::start().await;
    mount(&zabbix, "item.get", json!([])).await;
    mount(&zabbix, "host.get", json!([])).await;
    mount(&zabbix, "host.create", json!({"hostids": ["10084"]})).await;
    mount(&zabbix, "item.create", json!({"itemids": ["28000"]})).await;
    mount(&zabbix, "trigger.create", json!({"triggerids": ["13579"]})).await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/alert/create?name=err-5xx&index=%20nginx-*&query_string=status:5*")
        .header(header::AUTHORIZATION, OPS)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"delay":" 3m ","threshold":" >=10"}"#))
        .unwrap();
    let (status, _) = call(router(&zabbix, &search), req).await;
    assert_eq!(status, StatusCode::OK);

    let bodies: Vec<Value> = zabbix
        .received_requests()
        .await
        .expect("requests")
        .iter()
        .map(|req| serde_json::from_slice(&req.body).expect("json"))
        .collect();
    let params = |name: &str| {
        bodies
            .iter()
            .find(|body| body["method"] == name)
            .map(|body| body["params"].clone())
            .expect("call sent")
    };

    assert_eq!(params("host.create")["host"], "nginx-");
    let item = params("item.create");
    assert_eq!(item["delay"], "3m");
    assert!(item["posts"].as_str().unwrap().contains(r#""gte":"now-3m""#));
    assert!(item["url"].as_str().unwrap().ends_with("/nginx-*/_search"));
    assert_eq!(
        params("trigger.create")["expression"],
        "last(/nginx-/f35ad5edf2157b69ab60b6704732c743,#3)>=10"
    );
}
