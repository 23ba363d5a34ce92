use std::sync::Arc;

use api_ingress::HealthCheck;
use async_trait::async_trait;
use notebook_db::{DbHandle, RedisCache};

pub struct DatabaseHealth(pub Arc<DbHandle>);

#[async_trait]
impl HealthCheck for DatabaseHealth {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> anyhow::Result<()> {
        self.0.ping().await?;
        Ok(())
    }
}

pub struct CacheHealth(pub RedisCache);

#[async_trait]
impl HealthCheck for CacheHealth {
    fn name(&self) -> &str {
        "cache"
    }

    async fn check(&self) -> anyhow::Result<()> {
        self.0.ping().await?;
        Ok(())
    }
}
