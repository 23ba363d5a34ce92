use serde::{Deserialize, Serialize};

/// Configuration for the notebook module (`modules.notebook`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotebookConfig {
    /// Page size used when `limit` is absent or empty.
    #[serde(default = "default_page_size")]
    pub default_page_size: i64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl NotebookConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_page_size < 1 {
            anyhow::bail!("notebook.max_page_size must be at least 1");
        }
        if !(1..=self.max_page_size).contains(&self.default_page_size) {
            anyhow::bail!(
                "notebook.default_page_size must be between 1 and {}",
                self.max_page_size
            );
        }
        Ok(())
    }
}

fn default_page_size() -> i64 {
    10
}

fn default_max_page_size() -> i64 {
    100
}
