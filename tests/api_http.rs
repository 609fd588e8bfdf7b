// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use opinion_clusters::{router, EngineConfig};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    router(EngineConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Json>) -> (StatusCode, Json) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(req.body(body).expect("build request"))
        .await
        .expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let v = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Json::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, v)
}

fn seeds() -> Json {
    json!([
        {
            "cluster_id": 1,
            "heading": "communication tools",
            "opinions": [
                { "id": 1, "username": "ana", "text": "Slack is great", "weight": 7 }
            ]
        },
        { "cluster_id": 2, "heading": "office space", "position": { "x": 0.2, "y": 0.8 } }
    ])
}

#[tokio::test]
async fn health_returns_ok() {
    let app = test_router();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Json::String("ok".into()));
}

#[tokio::test]
async fn sentiment_endpoints() {
    let app = test_router();
    let (status, v) = send(
        &app,
        "POST",
        "/sentiment",
        Some(json!({ "text": "This is great and amazing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!((v["score"].as_f64().unwrap() - 0.2).abs() < 1e-9);
    assert_eq!(v["label"], json!("neutral"));

    let (status, v) = send(
        &app,
        "POST",
        "/sentiment/batch",
        Some(json!(["good great excellent love", "meh"])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["items"].as_array().unwrap().len(), 2);
    assert_eq!(v["stats"]["positive"], json!(1));
    assert_eq!(v["stats"]["neutral"], json!(1));
}

#[tokio::test]
async fn reseed_assign_and_present() {
    let app = test_router();

    let (status, _) = send(&app, "PUT", "/topics/t1/clusters", Some(seeds())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, v) = send(
        &app,
        "POST",
        "/topics/t1/messages",
        Some(json!({ "text": "we need better communication tools", "author": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["cluster_id"], json!(1));
    assert_eq!(v["fallback"], json!(false));
    assert!(v.get("sentiment").is_some());

    let (status, v) = send(&app, "GET", "/topics/t1/clusters/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["message_count"], json!(1));
    assert_eq!(v["state"], json!("active"));
    for key in ["radius", "fill_color", "stroke_color", "sentiment_avg"] {
        assert!(v.get(key).is_some(), "missing '{key}'");
    }
    assert!(v["fill_color"].as_str().unwrap().starts_with("hsl("));

    let (status, v) = send(&app, "GET", "/topics/t1/clusters", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["generation"], json!(1));
    assert_eq!(v["clusters"].as_array().unwrap().len(), 2);
    assert_eq!(v["clusters"][1]["state"], json!("empty"));

    let (status, v) = send(&app, "GET", "/topics/t1/messages?limit=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v[0]["assigned_cluster_id"], json!(1));
    assert_eq!(v[0]["author"], json!("bob"));
}

#[tokio::test]
async fn missing_topic_and_cluster_are_404() {
    let app = test_router();
    let (status, v) = send(
        &app,
        "POST",
        "/topics/nope/messages",
        Some(json!({ "text": "hi", "author": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], json!("TOPIC_NOT_FOUND"));

    send(&app, "PUT", "/topics/t2/clusters", Some(seeds())).await;
    let (status, v) = send(&app, "GET", "/topics/t2/clusters/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["code"], json!("CLUSTER_NOT_FOUND"));
}

#[tokio::test]
async fn duplicate_and_retired_ids_conflict() {
    let app = test_router();
    let (status, v) = send(
        &app,
        "PUT",
        "/topics/t3/clusters",
        Some(json!([{ "cluster_id": 1 }, { "cluster_id": 1 }])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(v["code"], json!("DUPLICATE_CLUSTER_ID"));

    send(&app, "PUT", "/topics/t3/clusters", Some(seeds())).await;
    send(
        &app,
        "PUT",
        "/topics/t3/clusters",
        Some(json!([{ "cluster_id": 1 }])),
    )
    .await;
    let (status, v) = send(
        &app,
        "PUT",
        "/topics/t3/clusters",
        Some(json!([{ "cluster_id": 2 }])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(v["code"], json!("CLUSTER_ID_REUSED"));
}

#[tokio::test]
async fn delete_topic_then_404() {
    let app = test_router();
    send(&app, "PUT", "/topics/t4/clusters", Some(seeds())).await;
    let (status, _) = send(&app, "DELETE", "/topics/t4", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", "/topics/t4/clusters", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", "/topics/t4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn long_message_accepted_without_cap() {
    let app = test_router();
    send(&app, "PUT", "/topics/t6/clusters", Some(seeds())).await;
    let text = "office space ".repeat(800);
    let (status, v) = send(
        &app,
        "POST",
        "/topics/t6/messages",
        Some(json!({ "text": text, "author": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["cluster_id"], json!(2));
}

#[tokio::test]
async fn oversized_message_is_413() {
    let mut cfg = EngineConfig::default();
    cfg.topic.max_message_chars = 10;
    let app = router(cfg);
    send(&app, "PUT", "/topics/t5/clusters", Some(seeds())).await;
    let (status, v) = send(
        &app,
        "POST",
        "/topics/t5/messages",
        Some(json!({ "text": "this is far longer than ten", "author": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(v["code"], json!("MESSAGE_TOO_LONG"));
}
