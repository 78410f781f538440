// Router-level tests against an in-memory database

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use lerecit::ProjectSummarizer;
use leserve::{build_app, AppState, ServerConfig};
use lestockage::Storage;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let storage = Storage::open_in_memory().unwrap();
    build_app(AppState::new(
        storage,
        ServerConfig::default(),
        ProjectSummarizer::deterministic(),
    ))
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    disposition: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Reply {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let header_text = |name| {
        response
            .headers()
            .get(name)
            .map(|v: &http::HeaderValue| v.to_str().unwrap().to_string())
    };
    let content_type = header_text(header::CONTENT_TYPE);
    let disposition = header_text(header::CONTENT_DISPOSITION);
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();

    Reply {
        status,
        content_type,
        disposition,
        body,
    }
}

fn portal() -> Value {
    json!({
        "name": "Portal",
        "owner": "Ana",
        "status": "In Progress",
        "start_date": "2025-01-01T00:00:00",
        "deadline": "2099-12-31",
        "description": "Customer self-service portal"
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app();
    let reply = send(&app, "GET", "/api/health", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "leserve");
    assert_eq!(json["model_ready"], false);
}

#[tokio::test]
async fn test_project_lifecycle_with_milestones() {
    let app = app();

    let created = send(&app, "POST", "/api/projects", Some(portal())).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let project = created.json();
    let id = project["id"].as_i64().unwrap();
    assert_eq!(project["status"], "In Progress");
    assert_eq!(project["completion_percentage"], 0.0);

    for (name, status) in [("Design", "Completed"), ("Build", "In Progress")] {
        let reply = send(
            &app,
            "POST",
            "/api/milestones",
            Some(json!({"project_id": id, "name": name, "target_date": "2099-06-01", "status": status})),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
    }

    let fetched = send(&app, "GET", &format!("/api/projects/{id}"), None).await;
    assert_eq!(fetched.json()["completion_percentage"], 50.0);

    let listed = send(&app, "GET", &format!("/api/milestones?project_id={id}"), None).await;
    let milestones = listed.json();
    assert_eq!(milestones.as_array().unwrap().len(), 2);

    let build_id = milestones[1]["id"].as_i64().unwrap();
    let updated = send(
        &app,
        "PUT",
        &format!("/api/milestones/{build_id}"),
        Some(json!({"status": "COMPLETED", "completion_date": "2025-05-01"})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["status"], "Completed");

    let fetched = send(&app, "GET", &format!("/api/projects/{id}"), None).await;
    assert_eq!(fetched.json()["completion_percentage"], 100.0);

    let renamed = send(
        &app,
        "PUT",
        &format!("/api/projects/{id}"),
        Some(json!({"name": "Portal v2", "description": null})),
    )
    .await;
    assert_eq!(renamed.json()["name"], "Portal v2");
    assert!(renamed.json()["description"].is_null());

    let deleted = send(&app, "DELETE", &format!("/api/projects/{id}"), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json()["message"], "Project deleted successfully");

    let missing = send(&app, "GET", &format!("/api/projects/{id}"), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["error"], "Project not found");

    let orphans = send(&app, "GET", "/api/milestones", None).await;
    assert!(orphans.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_and_invalid_bodies() {
    let app = app();

    let mut unknown_status = portal();
    unknown_status["status"] = json!("Paused");
    let reply = send(&app, "POST", "/api/projects", Some(unknown_status)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let mut bad_date = portal();
    bad_date["deadline"] = json!("next quarter");
    let reply = send(&app, "POST", "/api/projects", Some(bad_date)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(&app, "POST", "/api/projects", Some(json!({"name": "Portal", "owner": "Ana"}))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let mut too_complete = portal();
    too_complete["completion_percentage"] = json!(150.0);
    let reply = send(&app, "POST", "/api/projects", Some(too_complete)).await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);

    let mut blank_name = portal();
    blank_name["name"] = json!("   ");
    let reply = send(&app, "POST", "/api/projects", Some(blank_name)).await;
    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_risk_routes() {
    let app = app();

    let orphan = send(
        &app,
        "POST",
        "/api/risks",
        Some(json!({"project_id": 404, "name": "Vendor", "severity": "High"})),
    )
    .await;
    assert_eq!(orphan.status, StatusCode::NOT_FOUND);
    assert_eq!(orphan.json()["error"], "Project not found");

    let id = send(&app, "POST", "/api/projects", Some(portal())).await.json()["id"]
        .as_i64()
        .unwrap();
    let created = send(
        &app,
        "POST",
        "/api/risks",
        Some(json!({"project_id": id, "name": "Vendor", "severity": "high"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let risk = created.json();
    assert_eq!(risk["status"], "Open");
    assert_eq!(risk["severity"], "High");

    let risk_id = risk["id"].as_i64().unwrap();
    let closed = send(&app, "PUT", &format!("/api/risks/{risk_id}"), Some(json!({"status": "Closed"}))).await;
    assert_eq!(closed.json()["status"], "Closed");

    let bad = send(&app, "PUT", &format!("/api/risks/{risk_id}"), Some(json!({"severity": "Severe"}))).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let gone = send(&app, "DELETE", &format!("/api/risks/{risk_id}"), None).await;
    assert_eq!(gone.status, StatusCode::OK);
    let again = send(&app, "DELETE", &format!("/api/risks/{risk_id}"), None).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.json()["error"], "Risk not found");
}

#[tokio::test]
async fn test_kpis_on_empty_portfolio() {
    let app = app();
    let reply = send(&app, "GET", "/api/kpis", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    let json = reply.json();
    assert_eq!(json["total_projects"], 0);
    assert_eq!(json["high_risk_count"], 0);
}

#[tokio::test]
async fn test_exports() {
    let app = app();
    send(&app, "POST", "/api/projects", Some(portal())).await;

    let flat = send(&app, "GET", "/api/export/csv", None).await;
    assert_eq!(flat.status, StatusCode::OK);
    assert_eq!(flat.content_type.as_deref(), Some("text/csv"));
    assert_eq!(
        flat.disposition.as_deref(),
        Some("attachment; filename=\"project_export.csv\"")
    );
    assert!(flat.text().contains("Portal,Ana,In Progress,2025-01-01,2099-12-31,0.0"));

    let jira = send(&app, "GET", "/api/export/jira?project_key=TRK&assignee=ana", None).await;
    let text = jira.text();
    assert!(text.starts_with("Work Item ID,Summary"));
    assert!(text.contains("EPIC-1,Portal,Epic,Epic,TRK"));

    let default_key = send(&app, "GET", "/api/export/jira", None).await;
    assert!(default_key.text().contains("EPIC-1,Portal,Epic,Epic,PT"));

    let risks = send(&app, "GET", "/api/export/powerbi/risks", None).await;
    assert_eq!(risks.status, StatusCode::OK);
    assert_eq!(risks.text().lines().count(), 1);

    let unknown = send(&app, "GET", "/api/export/powerbi/charts", None).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summarize_endpoint() {
    let app = app();

    let missing = send(&app, "POST", "/api/ai/summarize/7", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let id = send(&app, "POST", "/api/projects", Some(portal())).await.json()["id"]
        .as_i64()
        .unwrap();
    let reply = send(&app, "POST", &format!("/api/ai/summarize/{id}"), None).await;
    assert_eq!(reply.status, StatusCode::OK);

    let json = reply.json();
    assert_eq!(json["source"], "deterministic");
    let summary = json["summary"].as_str().unwrap();
    assert!(summary.starts_with("Portal led by Ana is currently in progress at 0% completion."));
    assert!(summary.contains("No milestones have been defined yet."));
    assert_eq!(
        json["recommendations"][0],
        "Accelerate execution: completion is below 50%, so consider rebalancing resources."
    );
}
