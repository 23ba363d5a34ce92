use serde::{Deserialize, Serialize};

/// HTTP front-door settings, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port`. When absent the server section's host and port are used.
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default = "default_true")]
    pub enable_docs: bool,
    #[serde(default)]
    pub cors_enabled: bool,
    /// Directory served under `/media`. Relative paths resolve against the home
    /// dir; an empty value disables media serving.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,
}

fn default_true() -> bool {
    true
}

fn default_media_dir() -> String {
    "media".to_string()
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: None,
            enable_docs: true,
            cors_enabled: false,
            media_dir: default_media_dir(),
            body_limit_bytes: default_body_limit(),
            request_timeout_sec: default_request_timeout(),
        }
    }
}
