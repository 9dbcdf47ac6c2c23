//! Functional test following a job from submission to completion

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use printssistant_backend::{
    api::routes::create_router, canva::HttpCanvaClient, config::Settings, db::InMemoryJobStore,
    AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn create_app() -> Router {
    let mut settings = Settings::default();
    settings.rate_limit.enabled = false;
    let store = Arc::new(InMemoryJobStore::new());
    let canva = Arc::new(HttpCanvaClient::new(&settings.canva).unwrap());
    create_router(Arc::new(AppState::new(settings, store, canva))).await
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn export_event(design_id: &str) -> Value {
    json!({
        "event_type": "design.export.completed",
        "design_id": design_id,
        "design_title": "Menu",
        "export_url": format!("https://export.canva.com/{design_id}.pdf"),
        "customer_email": "cafe@example.com"
    })
}

#[tokio::test]
async fn test_form_job_lifecycle_with_canva_export() {
    let app = create_app().await;

    // Customer submits the form
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/jobs/form",
        Some(json!({
            "customerName": "Corner Cafe",
            "customerEmail": "cafe@example.com",
            "jobTitle": "Menus",
            "quantity": 40,
            "paperSize": "A3"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let job_id = body["jobId"].as_str().unwrap().to_string();

    // The design export lands on the same job
    let (status, body) = send(&app, Method::POST, "/api/webhooks/canva", Some(export_event("D1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jobId"], job_id.as_str());
    assert_eq!(body["data"]["status"], "asset_received");

    // A re-export overwrites the design details
    let (_, body) = send(&app, Method::POST, "/api/webhooks/canva", Some(export_event("D2"))).await;
    assert_eq!(body["jobId"], job_id.as_str());
    assert_eq!(body["data"]["design_id"], "D2");

    // Staff work the job through to completion
    let status_uri = format!("/api/jobs/{job_id}/status");
    for next in ["processing", "completed"] {
        let (status, body) =
            send(&app, Method::PATCH, &status_uri, Some(json!({ "status": next }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], next);
    }

    // Finished jobs cannot be reopened
    let (status, _) =
        send(&app, Method::PATCH, &status_uri, Some(json!({"status": "pending"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A later export no longer matches the completed job
    let (_, body) = send(&app, Method::POST, "/api/webhooks/canva", Some(export_event("D3"))).await;
    assert_eq!(body["message"], "Canva design received");
    assert_ne!(body["jobId"], job_id.as_str());
    assert_eq!(body["data"]["source"], "canva");

    let (status, body) = send(&app, Method::GET, "/api/jobs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["jobs"][0]["design_id"], "D3");
    assert_eq!(body["jobs"][1]["status"], "completed");
    assert_eq!(body["jobs"][1]["paper_size"], "A3");
}

#[tokio::test]
async fn test_email_and_cancellation_flow() {
    let app = create_app().await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/jobs/email",
        Some(json!({"from": "cafe@example.com", "subject": "Flyers for Friday"})),
    )
    .await;
    let job_id = body["jobId"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/jobs/{job_id}/status"),
        Some(json!({"status": "cancelled"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (_, body) = send(&app, Method::GET, "/api/jobs?status=cancelled", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["jobs"][0]["subject"], "Flyers for Friday");

    let (_, body) = send(&app, Method::GET, "/api/jobs?status=pending", None).await;
    assert_eq!(body["count"], 0);
}
