//! Harness-facing scenarios driven through the router in-process.

use std::time::Duration;

use atta::{Atta, AttaBuilder, MemoryPlatform, NodeSpec};
use atta_http::{router, ServerConfig, NOT_ENABLED_TEXT, TIMEOUT_TEXT};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

const URL: &str = "http://test/t1.html";

fn page() -> NodeSpec {
  let mut button = NodeSpec::with_id("btn1");
  button.attributes.role = "PUSH_BUTTON".into();
  let mut root = NodeSpec::default();
  root.uri = Some(URL.to_owned());
  root.children = vec![button];
  root
}

fn setup(platform: MemoryPlatform) -> (Atta<MemoryPlatform>, Router) {
  let atta = AttaBuilder::new()
    .ready_timeout(Duration::from_millis(100))
    .build(platform);
  if atta.is_enabled() {
    atta.start().unwrap();
  }
  let config = ServerConfig {
    run_timeout: Duration::from_millis(100),
    ..ServerConfig::default()
  };
  let app = router(atta.clone(), &config);
  (atta, app)
}

async fn send(app: &Router, method: &str, path: &str, body: &Value) -> (StatusCode, String) {
  let request = Request::builder()
    .method(method)
    .uri(path)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap();
  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
  let (status, text) = send(app, "POST", path, &body).await;
  (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn start_times_out_then_succeeds_once_the_document_loads() {
  let (atta, app) = setup(MemoryPlatform::new());

  let (status, body) = post(&app, "/start", json!({"test": "t1", "url": URL})).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["status"], "ERROR");
  assert_eq!(body["statusText"], TIMEOUT_TEXT);

  atta.platform().load_document(&page());

  let (status, body) = post(&app, "/start", json!({"test": "t1", "url": URL})).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "READY");
  assert_eq!(body["statusText"], "");
  assert_eq!(body["API"], "IAccessible2");
  assert!(body["ATTAname"].is_string());
}

#[tokio::test]
async fn start_waits_as_long_as_the_adapter_allows() {
  let atta = AttaBuilder::new()
    .ready_timeout(Duration::from_secs(2))
    .build(MemoryPlatform::new());
  atta.start().unwrap();
  let app = router(atta.clone(), &ServerConfig::default());

  let loader = atta.clone();
  let load = std::thread::spawn(move || {
    std::thread::sleep(Duration::from_millis(150));
    loader.platform().load_document(&page());
  });

  let (status, body) = post(&app, "/start", json!({"test": "t1", "url": URL})).await;
  load.join().unwrap();
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "READY");
  let pending = atta.pending_test().unwrap();
  assert_eq!((pending.name.as_str(), pending.url.as_str()), ("t1", URL));
}

#[tokio::test]
async fn passing_assertion() {
  let (atta, app) = setup(MemoryPlatform::new());
  atta.platform().load_document(&page());
  post(&app, "/start", json!({"test": "t1", "url": URL})).await;

  let (status, body) = post(
    &app,
    "/test",
    json!({
      "title": "button role",
      "id": "btn1",
      "data": [["property", "role", "is", "PUSH_BUTTON"]],
    }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "OK");
  assert_eq!(body["results"].as_array().unwrap().len(), 1);
  assert_eq!(body["results"][0]["result"], "PASS");
  assert!(body["results"][0]["log"]
    .as_str()
    .unwrap()
    .contains("property role is PUSH_BUTTON"));
  assert_eq!(atta.results().count("PASS"), 1);
}

#[tokio::test]
async fn unknown_element_is_an_error() {
  let (atta, app) = setup(MemoryPlatform::new());
  atta.platform().load_document(&page());
  post(&app, "/start", json!({"test": "t1", "url": URL})).await;

  let (_, body) = post(
    &app,
    "/test",
    json!({
      "title": "missing",
      "id": "missing-id",
      "data": [["property", "role", "is", "PUSH_BUTTON"]],
    }),
  )
  .await;
  assert_eq!(body["status"], "ERROR");
  assert_eq!(body["message"], "Element not found");
  assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_before_start_is_not_ready() {
  let (atta, app) = setup(MemoryPlatform::new());
  atta.platform().load_document(&page());

  let (_, body) = post(&app, "/test", json!({"id": "btn1", "data": []})).await;
  assert_eq!(body["status"], "ERROR");
  assert_eq!(body["message"], "ATTA not ready");
  assert_eq!(body["statusText"], "Parameter title not found");
}

#[tokio::test]
async fn missing_start_parameters_are_listed() {
  let (_, app) = setup(MemoryPlatform::new());
  let (status, body) = post(&app, "/start", json!({})).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "ERROR");
  assert_eq!(
    body["statusText"],
    "Parameter test not found; Parameter url not found"
  );
}

#[tokio::test]
async fn disabled_adapter_must_be_run_manually() {
  let (_, app) = setup(MemoryPlatform::new().with_accessibility(false));
  let (_, body) = post(&app, "/start", json!({"test": "t1", "url": URL})).await;
  assert_eq!(body["status"], "ERROR");
  assert_eq!(body["statusText"], NOT_ENABLED_TEXT);
}

#[tokio::test]
async fn listen_and_end() {
  let (atta, app) = setup(MemoryPlatform::new());

  let (_, body) = post(
    &app,
    "/startlisten",
    json!({"events": ["EVENT_OBJECT_VALUECHANGE"]}),
  )
  .await;
  assert_eq!(body["status"], "READY");
  assert_eq!(atta.monitored_events().len(), 1);

  let (_, body) = post(&app, "/stoplisten", json!({})).await;
  assert_eq!(body["status"], "READY");
  assert!(atta.monitored_events().is_empty());

  let (_, body) = post(&app, "/end", json!({})).await;
  assert_eq!(body["status"], "DONE");
  assert!(atta.pending_test().is_none());
}

#[tokio::test]
async fn unknown_paths_are_rejected_in_plain_text() {
  let (_, app) = setup(MemoryPlatform::new());
  let (status, text) = send(&app, "POST", "/bogus", &json!({})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(text, "UNHANDLED PATH: /bogus\n");
}

#[tokio::test]
async fn every_response_carries_cors_headers() {
  let (_, app) = setup(MemoryPlatform::new());
  for method in ["OPTIONS", "GET", "POST"] {
    let request = Request::builder()
      .method(method)
      .uri("/end")
      .body(Body::empty())
      .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(headers["access-control-allow-methods"], "POST");
    assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    assert_eq!(headers["access-control-expose-headers"], "Allow, Content-Type");
    assert_eq!(headers["allow"], "POST");
  }
}

#[tokio::test]
async fn bodies_are_pretty_printed_with_sorted_keys() {
  let (_, app) = setup(MemoryPlatform::new());
  let (_, text) = send(&app, "POST", "/end", &json!({})).await;
  assert_eq!(text, "{\n    \"status\": \"DONE\",\n    \"statusText\": \"\"\n}");
}
