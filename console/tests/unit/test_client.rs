//! REST and event-stream client tests against a local backend

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::stream;
use openapi_client::models::{CreateProjectRequest, Language};
use serde_json::json;
use tokio::net::TcpListener;

use snapdeploy::authn::session_token::SessionToken;
use snapdeploy::authn::token_source::StaticTokenSource;
use snapdeploy::http::client::{HttpClient, REQUEST_ID_HEADER};
use snapdeploy::http::repositories::RepositoryQuery;
use snapdeploy::notify::Notice;
use snapdeploy::stream::connection::{ConnectionUpdate, DedupPolicy, LogStreamConnection};
use snapdeploy::stream::source::HttpLogStreamSource;

const TOKEN: &str = "good-token";

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn health(headers: HeaderMap) -> Response {
    if !headers.contains_key(REQUEST_ID_HEADER) {
        return error(StatusCode::BAD_REQUEST, "missing_request_id", "request ID required");
    }
    Json(json!({ "status": "ok", "version": "1.4.2" })).into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "unauthorized", "Invalid token");
    }
    Json(json!({ "id": "user-1", "email": "dev@example.com", "first_name": "Dana" })).into_response()
}

async fn latest(Path(project_id): Path<String>) -> Response {
    error(
        StatusCode::NOT_FOUND,
        "not_found",
        &format!("project {} has no deployments", project_id),
    )
}

async fn delete_deployment(Path(id): Path<String>) -> Response {
    if id == "locked" {
        return error(StatusCode::FORBIDDEN, "forbidden", "not your deployment");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_project() -> Response {
    error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "invalid",
        "install_command is required",
    )
}

async fn repositories(Query(params): Query<HashMap<String, String>>) -> Response {
    let name = params.get("search").cloned().unwrap_or_else(|| "all".to_string());
    Json(json!({
        "repositories": [{ "name": name, "private": false }],
        "pagination": { "page": 1, "limit": 20, "total": 1, "total_pages": 1 }
    }))
    .into_response()
}

async fn log_stream(
    headers: HeaderMap,
) -> Result<Sse<impl futures::Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let events = vec![
        Event::default().event("log").data("Step 1"),
        Event::default().event("heartbeat").data("ping"),
        Event::default().event("log").data("Step 1"),
        Event::default().event("log").data("Step 2"),
    ];
    Ok(Sse::new(stream::iter(events.into_iter().map(Ok::<Event, Infallible>))))
}

async fn serve() -> String {
    let router = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/projects/{id}/deployments/latest", get(latest))
        .route("/api/v1/deployments/{id}", delete(delete_deployment))
        .route("/api/v1/deployments/{id}/logs/stream", get(log_stream))
        .route("/api/v1/users/{id}/projects", post(create_project))
        .route("/api/v1/users/{id}/repositories", get(repositories));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

fn token() -> SessionToken {
    SessionToken::from_raw(TOKEN).unwrap()
}

#[tokio::test]
async fn test_health_sends_request_id() {
    let client = HttpClient::new(&serve().await).unwrap();
    let health = client.get_health(None).await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version.as_deref(), Some("1.4.2"));
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let client = HttpClient::new(&serve().await).unwrap();
    let token = token();
    let user = client.get_current_user(Some(&token)).await.unwrap();
    assert_eq!(user.id, "user-1");
    assert_eq!(user.first_name.as_deref(), Some("Dana"));
}

#[tokio::test]
async fn test_missing_token_is_an_authentication_error() {
    let client = HttpClient::new(&serve().await).unwrap();
    let err = client.get_current_user(None).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));

    let notice = Notice::from_error("Failed to load profile", &err);
    assert_eq!(notice.title, "Authentication error");
}

#[tokio::test]
async fn test_latest_deployment_absent_is_none() {
    let client = HttpClient::new(&serve().await).unwrap();
    let token = token();
    let latest = client
        .latest_project_deployment("proj-1", Some(&token))
        .await
        .unwrap();
    assert!(latest.is_none());
}

#[tokio::test]
async fn test_delete_accepts_no_content_and_reports_forbidden() {
    let client = HttpClient::new(&serve().await).unwrap();
    let token = token();
    client.delete_deployment("dep-1", Some(&token)).await.unwrap();

    let err = client
        .delete_deployment("locked", Some(&token))
        .await
        .unwrap_err();
    let notice = Notice::from_error("Failed to delete deployment", &err);
    assert_eq!(notice.title, "Permission denied");
}

#[tokio::test]
async fn test_validation_failure_uses_payload_message() {
    let client = HttpClient::new(&serve().await).unwrap();
    let token = token();
    let request = CreateProjectRequest {
        repository_url: "https://github.com/acme/web".to_string(),
        install_command: String::new(),
        build_command: None,
        run_command: "npm start".to_string(),
        language: Language::Node,
        custom_domain: None,
        require_db: false,
        migration_command: None,
    };
    let err = client
        .create_project("user-1", &request, Some(&token))
        .await
        .unwrap_err();
    assert_eq!(err.api_code(), Some("invalid"));

    let notice = Notice::from_error("Failed to create project", &err);
    assert_eq!(notice.title, "Failed to create project");
    assert_eq!(notice.description.as_deref(), Some("install_command is required"));
}

#[tokio::test]
async fn test_repository_search_is_sent_as_query() {
    let client = HttpClient::new(&serve().await).unwrap();
    let token = token();
    let query = RepositoryQuery {
        search: Some("web".to_string()),
        ..RepositoryQuery::default()
    };
    let response = client
        .list_user_repositories("user-1", &query, Some(&token))
        .await
        .unwrap();
    assert_eq!(response.repositories.len(), 1);
    assert_eq!(response.repositories[0].name, "web");
}

#[tokio::test]
async fn test_live_stream_over_sse() {
    let client = Arc::new(HttpClient::new(&serve().await).unwrap());
    let tokens = Arc::new(StaticTokenSource::new(Some(token())));
    let source = Arc::new(HttpLogStreamSource::new(client, tokens));
    let mut connection = LogStreamConnection::new(source, DedupPolicy::Content);
    assert!(connection.open("dep-1"));

    let mut updates = Vec::new();
    loop {
        let update = tokio::time::timeout(Duration::from_secs(5), connection.next_update())
            .await
            .expect("stream stalled");
        let failed = matches!(update, ConnectionUpdate::Failed(_));
        updates.push(update);
        if failed {
            break;
        }
    }

    assert_eq!(updates[0], ConnectionUpdate::Opened);
    assert!(updates.contains(&ConnectionUpdate::Heartbeat));
    assert!(updates.contains(&ConnectionUpdate::Duplicate));
    assert_eq!(connection.lines(), ["Step 1", "Step 2"]);
    assert_eq!(connection.duplicates_dropped(), 1);
    assert!(!connection.is_connected());
    assert!(connection.is_held());
    assert!(connection.error().is_some());
}

#[tokio::test]
async fn test_live_stream_rejected_without_token() {
    let client = Arc::new(HttpClient::new(&serve().await).unwrap());
    let source = Arc::new(HttpLogStreamSource::new(
        client,
        Arc::new(StaticTokenSource::anonymous()),
    ));
    let mut connection = LogStreamConnection::new(source, DedupPolicy::Content);
    connection.open("dep-1");

    let update = tokio::time::timeout(Duration::from_secs(5), connection.next_update())
        .await
        .unwrap();
    assert!(matches!(update, ConnectionUpdate::Failed(_)));
    assert!(!connection.has_transport());
}
