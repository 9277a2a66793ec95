use axum::Router;
use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;

async fn initiate(app: &Router, repo: &str, version: &str, environment: &str) -> String {
    let (status, body) = common::post_json(
        app,
        "/deployments",
        &json!({
            "repo": repo,
            "version": version,
            "environment": environment,
            "deployed_by": "Jane Smith",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["deployment_id"].as_str().unwrap().to_string()
}

fn repos_of(rows: &Value) -> Vec<String> {
    rows.as_array()
        .expect("response is an array")
        .iter()
        .map(|row| row["repo"].as_str().unwrap().to_string())
        .collect()
}

/// Repo and environment predicates AND together; an empty filter (or an
/// empty environment value) matches everything.
#[tokio::test]
async fn filters_combine_and_empty_matches_all() {
    let app = common::app();
    initiate(&app, "josys-src/alert-service", "1.2.0", "development").await;
    initiate(&app, "josys-src/alert-service", "1.1.0", "staging").await;
    initiate(&app, "josys-src/billing", "2.0.0", "staging").await;
    initiate(&app, "josys-src/frontend", "3.0.0", "production").await;

    let (status, rows) = common::get(&app, "/deployments").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 4);
    for row in rows.as_array().unwrap() {
        assert!(row["elapsed_time"].as_str().unwrap().len() >= 8);
    }

    let (_, rows) = common::get(&app, "/deployments?repos=josys-src%2Fbilling").await;
    assert_eq!(repos_of(&rows), ["josys-src/billing"]);

    let (_, rows) = common::get(
        &app,
        "/deployments?repos=josys-src%2Falert-service&repos=josys-src%2Fbilling",
    )
    .await;
    assert_eq!(rows.as_array().unwrap().len(), 3);

    let (_, rows) = common::get(&app, "/deployments?environment=staging").await;
    assert_eq!(
        repos_of(&rows),
        ["josys-src/alert-service", "josys-src/billing"]
    );

    let (_, rows) = common::get(
        &app,
        "/deployments?repos=josys-src%2Falert-service&environment=staging",
    )
    .await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["version"], json!("1.1.0"));

    let (_, rows) = common::get(&app, "/deployments?environment=").await;
    assert_eq!(rows.as_array().unwrap().len(), 4);

    let (_, rows) = common::get(&app, "/deployments?repos=ghost").await;
    assert_eq!(rows.as_array().unwrap().len(), 0);
}

/// A new deployment to an occupied slot supersedes the record; the old
/// deployment stops resolving but its timeline survives.
#[tokio::test]
async fn superseding_keeps_the_old_timeline() {
    let app = common::app();
    let repo = "josys-src/alert-service";

    let first = initiate(&app, repo, "1.2.0", "development").await;
    let (status, _) = common::post_json(
        &app,
        "/events",
        &json!({
            "deployment_id": first,
            "repo": repo,
            "environment": "development",
            "status": "testing",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let second = initiate(&app, repo, "1.3.0", "development").await;

    // One current record per slot, owned by the newcomer.
    let (_, rows) = common::get(&app, "/deployments").await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["deployment_id"], json!(second.clone()));
    assert_eq!(rows[0]["version"], json!("1.3.0"));

    let (status, _) = common::get(&app, &format!("/deployments/{first}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, events) = common::get(&app, &format!("/deployments/{first}/events")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 2);

    // Late events for the superseded deployment stay log-only.
    let (status, _) = common::post_json(
        &app,
        "/events",
        &json!({
            "deployment_id": first,
            "repo": repo,
            "environment": "development",
            "status": "completed",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, current) = common::get(
        &app,
        "/deployments/current?repo=josys-src%2Falert-service&environment=development",
    )
    .await;
    assert_eq!(current["deployment_id"], json!(second));
    assert_eq!(current["status"], json!("in-progress"));

    let (_, history) = common::get(
        &app,
        "/promotions/history?repo=josys-src%2Falert-service&version=1.2.0",
    )
    .await;
    assert_eq!(history["history"], json!([]));
}

/// Timelines come back ordered by event timestamp no matter the order the
/// events arrived in.
#[tokio::test]
async fn timelines_sort_late_arrivals() {
    let app = common::app();

    for (timestamp, message) in [
        ("2024-03-01T12:30:00Z", "third"),
        ("2024-03-01T12:00:00Z", "first"),
        ("2024-03-01T12:10:00Z", "second"),
    ] {
        let (status, _) = common::post_json(
            &app,
            "/events",
            &json!({
                "deployment_id": "build-7",
                "repo": "josys-src/frontend",
                "environment": "development",
                "timestamp": timestamp,
                "status": "in-progress",
                "message": message,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, events) = common::get(&app, "/deployments/build-7/events").await;
    assert_eq!(status, StatusCode::OK);
    let messages: Vec<_> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages, ["first", "second", "third"]);

    // Unknown timelines read back empty rather than failing.
    let (status, events) = common::get(&app, "/deployments/never-seen/events").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events, json!([]));
}

/// Slot lookups 404 until something is deployed there.
#[tokio::test]
async fn current_slot_lookup() {
    let app = common::app();

    let (status, _) = common::get(
        &app,
        "/deployments/current?repo=josys-src%2Fbilling&environment=development",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = initiate(&app, "josys-src/billing", "2.0.0", "development").await;
    let (status, current) = common::get(
        &app,
        "/deployments/current?repo=josys-src%2Fbilling&environment=development",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current["deployment_id"], json!(id));
}

/// Initiation only accepts the statuses a deployment can start in.
#[tokio::test]
async fn initiation_validates_status() {
    let app = common::app();

    for status_value in ["testing", "completed", "failed"] {
        let (status, _) = common::post_json(
            &app,
            "/deployments",
            &json!({
                "repo": "josys-src/billing",
                "version": "2.0.0",
                "environment": "development",
                "deployed_by": "Jane Smith",
                "status": status_value,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, rows) = common::get(&app, "/deployments").await;
    assert_eq!(rows.as_array().unwrap().len(), 0);
}

/// Dashboard counts the current records by status.
#[tokio::test]
async fn dashboard_counts_by_status() {
    let app = common::app();
    let done = initiate(&app, "josys-src/alert-service", "1.2.0", "development").await;
    initiate(&app, "josys-src/billing", "2.0.0", "staging").await;
    initiate(&app, "josys-src/frontend", "3.0.0", "production").await;

    let (status, _) = common::post_json(
        &app,
        "/events",
        &json!({
            "deployment_id": done,
            "repo": "josys-src/alert-service",
            "environment": "development",
            "status": "completed",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, dashboard) = common::get(&app, "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["total_count"], json!(3));
    assert_eq!(dashboard["completed_count"], json!(1));
    assert_eq!(dashboard["in_progress_count"], json!(2));
}

/// Liveness and docs endpoints are served without state.
#[tokio::test]
async fn health_and_docs_respond() {
    let app = common::app();

    let (status, _) = common::get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, openapi) = common::get(&app, "/docs/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(openapi["openapi"].as_str().is_some());
    assert!(openapi["paths"]["/deployments"].is_object());
}
