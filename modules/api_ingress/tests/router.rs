use std::sync::Arc;

use api_ingress::{ApiIngress, ApiIngressConfig, HealthCheck};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::util::ServiceExt;
use utoipa::openapi::path::{HttpMethod, OperationBuilder, PathItem, PathsBuilder};
use utoipa::openapi::OpenApiBuilder;

struct StaticCheck {
    name: &'static str,
    up: bool,
}

#[async_trait]
impl HealthCheck for StaticCheck {
    fn name(&self) -> &str {
        self.name
    }

    async fn check(&self) -> anyhow::Result<()> {
        if self.up {
            Ok(())
        } else {
            anyhow::bail!("connection refused")
        }
    }
}

fn module_doc() -> utoipa::openapi::OpenApi {
    OpenApiBuilder::new()
        .paths(PathsBuilder::new().path(
            "/v1/things",
            PathItem::new(HttpMethod::Post, OperationBuilder::new().build()),
        ))
        .build()
}

fn ingress(config: ApiIngressConfig) -> ApiIngress {
    let routes = Router::new().route("/v1/things", post(|body: String| async move { body }));
    ApiIngress::new(config).mount(routes, module_doc())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn health_is_healthy_when_all_checks_pass() {
    let app = ingress(ApiIngressConfig::default())
        .health_check(Arc::new(StaticCheck {
            name: "database",
            up: true,
        }))
        .build_router()
        .unwrap();

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "up");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn health_is_degraded_when_a_check_fails() {
    let app = ingress(ApiIngressConfig::default())
        .health_check(Arc::new(StaticCheck {
            name: "database",
            up: true,
        }))
        .health_check(Arc::new(StaticCheck {
            name: "cache",
            up: false,
        }))
        .build_router()
        .unwrap();

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["error"], "connection refused");
}

#[tokio::test]
async fn openapi_and_docs_are_served_when_enabled() {
    let app = ingress(ApiIngressConfig::default()).build_router().unwrap();

    let (status, body) = get(app.clone(), "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(doc["info"]["title"], "Notebook API");
    assert!(doc["paths"]["/v1/things"]["post"].is_object());

    let (status, html) = get(app, "/docs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("apiDescriptionUrl=\"/openapi.json\""));
}

#[tokio::test]
async fn docs_can_be_disabled() {
    let config = ApiIngressConfig {
        enable_docs: false,
        ..ApiIngressConfig::default()
    };
    let app = ingress(config).build_router().unwrap();

    assert_eq!(get(app.clone(), "/openapi.json").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(app, "/docs").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_gets_json_404() {
    let app = ingress(ApiIngressConfig::default()).build_router().unwrap();

    let (status, body) = get(app, "/v2/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "No route for GET /v2/nothing");
}

#[tokio::test]
async fn media_files_are_served_from_the_media_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("avatar.txt"), "pixels").unwrap();

    let app = ingress(ApiIngressConfig::default())
        .with_media_root(Some(dir.path().to_path_buf()))
        .build_router()
        .unwrap();

    let (status, body) = get(app.clone(), "/media/avatar.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "pixels");

    assert_eq!(get(app, "/media/missing.txt").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_media_dir_disables_media_route() {
    let config = ApiIngressConfig {
        media_dir: String::new(),
        ..ApiIngressConfig::default()
    };
    let app = ingress(config).build_router().unwrap();

    let (status, body) = get(app, "/media/avatar.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "No route for GET /media/avatar.txt");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let config = ApiIngressConfig {
        body_limit_bytes: 8,
        ..ApiIngressConfig::default()
    };
    let app = ingress(config).build_router().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/things")
                .header("content-length", "32")
                .body(Body::from("x".repeat(32)))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn serves_over_tcp_until_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        ingress(ApiIngressConfig::default())
            .serve_listener(listener, async {
                let _ = rx.await;
            })
            .await
    });

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut reply = String::new();
    stream.read_to_string(&mut reply).await.unwrap();
    assert!(reply.starts_with("HTTP/1.1 200"), "{reply}");
    assert!(reply.contains("\"status\":\"healthy\""));

    tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
