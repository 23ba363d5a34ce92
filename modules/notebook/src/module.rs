use std::sync::Arc;

use notebook_db::DbHandle;
use tracing::{debug, info};

use crate::api::rest::{openapi::NotebookApiDoc, routes};
use crate::config::NotebookConfig;
use crate::domain::service::{Service, ServiceConfig};
use crate::infra::storage::{migrations, SqlNotesRepository, SqlUsersRepository};

/// Wired notebook module: domain service plus its REST surface.
#[derive(Clone)]
pub struct Notebook {
    service: Arc<Service>,
}

impl Notebook {
    /// Apply the schema, then wire the SQL repositories into the domain service.
    pub async fn init(db: Arc<DbHandle>, cfg: NotebookConfig) -> anyhow::Result<Self> {
        info!("Initializing notebook module");
        cfg.validate()?;
        debug!(
            "Loaded notebook config: default_page_size={}, max_page_size={}",
            cfg.default_page_size, cfg.max_page_size
        );

        migrations::run(&db).await?;

        let service = Service::new(
            Arc::new(SqlUsersRepository::new(db.clone())),
            Arc::new(SqlNotesRepository::new(db)),
            ServiceConfig {
                default_page_size: cfg.default_page_size,
                max_page_size: cfg.max_page_size,
            },
        );
        Ok(Self::from_service(Arc::new(service)))
    }

    pub fn from_service(service: Arc<Service>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// `/v1/users` and `/v1/notes` routes bound to this module's service.
    pub fn router(&self) -> axum::Router {
        routes::router(self.service.clone())
    }

    pub fn openapi() -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi;
        NotebookApiDoc::openapi()
    }
}
