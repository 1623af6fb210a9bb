use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::queue::{PersistentQueueStore, QueueService};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, AppState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn temp_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("server_routes_{}", Uuid::new_v4()))
        .join("queue_state.json")
}

async fn build_app(path: &PathBuf) -> Router {
    let store = PersistentQueueStore::open(path).await;
    let queue: Arc<dyn QueueService> = Arc::new(store);
    routes::build_router(AppState::new(queue), cors())
}

async fn cleanup(path: &PathBuf) {
    if let Some(dir) = path.parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}

fn enqueue_req(body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/queue/enqueue")
        .header("content-type", "application/json")
        .body(body)
        .expect("request")
}

fn empty_req(method: &str, uri: &str) -> Request<Body> {
    Request::builder().method(method).uri(uri).body(Body::empty()).expect("request")
}

async fn json_body(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_reports_healthy() -> anyhow::Result<()> {
    let path = temp_path();
    let app = build_app(&path).await;
    let resp = app.oneshot(empty_req("GET", "/")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await?, json!({"message": "Healthy"}));
    cleanup(&path).await;
    Ok(())
}

#[tokio::test]
async fn enqueue_dequeue_status_scenario() -> anyhow::Result<()> {
    let path = temp_path();
    let app = build_app(&path).await;

    let resp = app.clone().oneshot(enqueue_req(Body::from(json!({"payload": "hello"}).to_string()))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers().get(header::LOCATION).expect("location").to_str()?.to_string();
    let body = json_body(resp).await?;
    assert_eq!(body["item"]["payload"], "hello");
    assert_eq!(body["position"], 1);
    assert!(body["item"]["enqueuedAt"].is_string());
    let id = body["item"]["id"].as_str().expect("id");
    assert_eq!(location, format!("/api/queue/items/{id}"));

    let resp = app.clone().oneshot(enqueue_req(Body::from(json!({"payload": "world"}).to_string()))).await?;
    assert_eq!(json_body(resp).await?["position"], 2);

    let resp = app.clone().oneshot(empty_req("POST", "/api/queue/dequeue")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await?["item"]["payload"], "hello");

    let resp = app.clone().oneshot(empty_req("GET", "/api/queue/status")).await?;
    assert_eq!(json_body(resp).await?, json!({"count": 1, "isEmpty": false}));

    let resp = app.clone().oneshot(empty_req("POST", "/api/queue/dequeue")).await?;
    assert_eq!(json_body(resp).await?["item"]["payload"], "world");

    let resp = app.clone().oneshot(empty_req("POST", "/api/queue/dequeue")).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(to_bytes(resp.into_body(), usize::MAX).await?.is_empty());

    let resp = app.oneshot(empty_req("GET", "/api/queue/status")).await?;
    assert_eq!(json_body(resp).await?, json!({"count": 0, "isEmpty": true}));

    cleanup(&path).await;
    Ok(())
}

#[tokio::test]
async fn bad_enqueue_bodies_are_400() -> anyhow::Result<()> {
    let path = temp_path();
    let app = build_app(&path).await;

    let bodies = [
        json!({"payload": ""}).to_string(),
        json!({"payload": "   \t"}).to_string(),
        json!({}).to_string(),
        json!({"payload": null}).to_string(),
        json!({"payload": 42}).to_string(),
        "not json".to_string(),
    ];
    for b in bodies {
        let resp = app.clone().oneshot(enqueue_req(Body::from(b.clone()))).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {b}");
        assert_eq!(json_body(resp).await?["error"], "Payload is required.");
    }

    // Missing content-type is rejected the same way.
    let req = Request::builder()
        .method("POST")
        .uri("/api/queue/enqueue")
        .body(Body::from(json!({"payload": "x"}).to_string()))?;
    assert_eq!(app.clone().oneshot(req).await?.status(), StatusCode::BAD_REQUEST);

    let resp = app.oneshot(empty_req("GET", "/api/queue/status")).await?;
    assert_eq!(json_body(resp).await?["count"], 0);

    cleanup(&path).await;
    Ok(())
}

#[tokio::test]
async fn state_survives_router_rebuild() -> anyhow::Result<()> {
    let path = temp_path();
    {
        let app = build_app(&path).await;
        for p in ["A", "B", "C"] {
            let resp = app.clone().oneshot(enqueue_req(Body::from(json!({"payload": p}).to_string()))).await?;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }
    }

    let app = build_app(&path).await;
    let resp = app.clone().oneshot(empty_req("GET", "/api/queue/status")).await?;
    assert_eq!(json_body(resp).await?["count"], 3);
    for expected in ["A", "B", "C"] {
        let resp = app.clone().oneshot(empty_req("POST", "/api/queue/dequeue")).await?;
        assert_eq!(json_body(resp).await?["item"]["payload"], expected);
    }

    cleanup(&path).await;
    Ok(())
}

#[tokio::test]
async fn cors_preflight_mirrors_origin() -> anyhow::Result<()> {
    let path = temp_path();
    let app = build_app(&path).await;
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/queue/enqueue")
        .header("origin", "http://example.test")
        .header("access-control-request-method", "POST")
        .body(Body::empty())?;
    let resp = app.oneshot(req).await?;
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("access-control-allow-origin").map(|v| v.to_str().unwrap_or_default()),
        Some("http://example.test")
    );
    assert_eq!(
        resp.headers().get("access-control-allow-credentials").map(|v| v.to_str().unwrap_or_default()),
        Some("true")
    );
    cleanup(&path).await;
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> anyhow::Result<()> {
    let path = temp_path();
    let app = build_app(&path).await;
    let resp = app.oneshot(empty_req("GET", "/api-docs/openapi.json")).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = json_body(resp).await?;
    assert!(doc["paths"].get("/api/queue/enqueue").is_some());
    cleanup(&path).await;
    Ok(())
}
