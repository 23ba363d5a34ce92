use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

/// A dependency probed by `GET /health`.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Key under `checks` in the health report.
    fn name(&self) -> &str;

    async fn check(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckResult {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub checks: BTreeMap<String, CheckResult>,
    pub timestamp: String,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Run every check in order. Any failure marks the report `degraded`.
pub async fn run_checks(checks: &[Arc<dyn HealthCheck>]) -> HealthReport {
    let mut results = BTreeMap::new();
    let mut healthy = true;

    for check in checks {
        let result = match check.check().await {
            Ok(()) => CheckResult {
                status: "up",
                error: None,
            },
            Err(e) => {
                healthy = false;
                let error = format!("{e:#}");
                tracing::warn!(check = check.name(), %error, "health check failed");
                CheckResult {
                    status: "down",
                    error: Some(error),
                }
            }
        };
        results.insert(check.name().to_string(), result);
    }

    HealthReport {
        status: if healthy { "healthy" } else { "degraded" },
        checks: results,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}
