//! HTTP front door: mounts module routers behind the shared middleware stack
//! and serves health, OpenAPI, docs and media endpoints next to them.

use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{middleware::from_fn, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
};

mod config;
pub mod health;
pub mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
pub use health::{HealthCheck, HealthReport};

/// Collects module routes, their OpenAPI documents and health checks, then
/// builds and serves the outer router.
pub struct ApiIngress {
    config: ApiIngressConfig,
    routes: Router,
    openapi: utoipa::openapi::OpenApi,
    checks: Vec<Arc<dyn HealthCheck>>,
    media_root: Option<PathBuf>,
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        let media_root = Some(config.media_dir.as_str())
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        Self {
            config,
            routes: Router::new(),
            openapi: openapi::base_document("Notebook API", env!("CARGO_PKG_VERSION")),
            checks: Vec::new(),
            media_root,
        }
    }

    /// Directory served under `/media`, already resolved by the caller.
    pub fn with_media_root(mut self, dir: Option<PathBuf>) -> Self {
        self.media_root = dir;
        self
    }

    /// Add a module's routes and its OpenAPI document.
    pub fn mount(mut self, routes: Router, doc: utoipa::openapi::OpenApi) -> Self {
        self.routes = self.routes.merge(routes);
        self.openapi = openapi::merge_documents(self.openapi, [doc]);
        self
    }

    pub fn health_check(mut self, check: Arc<dyn HealthCheck>) -> Self {
        tracing::debug!(check = check.name(), "registered health check");
        self.checks.push(check);
        self
    }

    /// Build the HTTP router from mounted routes and the built-in endpoints.
    pub fn build_router(&self) -> Result<Router> {
        tracing::debug!("Building router");
        let checks: web::HealthChecks = Arc::new(self.checks.clone());
        let mut router = self.routes.clone().merge(
            Router::new()
                .route("/health", get(web::health_check))
                .with_state(checks),
        );

        if self.config.enable_docs {
            let doc = Arc::new(serde_json::to_value(&self.openapi).context("serialize OpenAPI")?);
            router = router
                .merge(
                    Router::new()
                        .route("/openapi.json", get(web::serve_openapi))
                        .with_state(doc),
                )
                .route("/docs", get(web::serve_docs));
        }

        if let Some(dir) = &self.media_root {
            tracing::info!(dir = %dir.display(), "serving media files under /media");
            router = router.nest_service("/media", ServeDir::new(dir));
        }

        router = router.fallback(web::not_found);

        // Each layer wraps the ones added before it, so the last one is outermost:
        // SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions
        // -> Timeout -> CORS -> BodyLimit
        router = router.layer(RequestBodyLimitLayer::new(self.config.body_limit_bytes));
        if self.config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(TimeoutLayer::new(Duration::from_secs(
            self.config.request_timeout_sec,
        )));
        router = router.layer(from_fn(request_id::push_req_id_to_extensions));
        router = router.layer(request_id::create_trace_layer());

        let x_request_id = request_id::header();
        router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
        router = router.layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId));

        Ok(router)
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    pub async fn serve<F>(&self, addr: &str, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", addr, e))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        self.serve_listener(listener, shutdown).await
    }

    pub async fn serve_listener<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router()?;
        tracing::info!("HTTP server bound on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("HTTP server shutting down gracefully");
            })
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}
