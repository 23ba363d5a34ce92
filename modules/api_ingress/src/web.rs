use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::health::{run_checks, HealthCheck};

pub type HealthChecks = Arc<Vec<Arc<dyn HealthCheck>>>;

/// 200 when every check passes, 503 otherwise.
pub async fn health_check(State(checks): State<HealthChecks>) -> Response {
    let report = run_checks(&checks).await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

pub async fn serve_openapi(State(doc): State<Arc<Value>>) -> Response {
    let json = Json((*doc).clone());
    ([(header::CACHE_CONTROL, "no-store")], json).into_response()
}

pub async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Notebook API</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}

pub async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("No route for {method} {}", uri.path()) })),
    )
}
