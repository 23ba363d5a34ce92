//! Process-wide runtime plumbing: layered configuration and logging.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{
    AppConfig, CacheConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig,
};
pub use logging::init_logging_from_config;
