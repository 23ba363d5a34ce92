use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::paths::resolve_home_dir;

/// DSN used by `--mock`: a private in-memory SQLite database.
pub const MOCK_DATABASE_URL: &str = "sqlite::memory:";

const DEFAULT_SUBDIR: &str = ".notebook";

/// Main application configuration with strongly-typed global sections
/// and a flexible per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Relational store; `None` means the server cannot start.
    pub database: Option<DatabaseConfig>,
    /// Key-value cache; optional collaborator.
    #[serde(default)]
    pub cache: Option<CacheConfig>,
    pub logging: Option<LoggingConfig>,
    /// Per-module configuration bag: module name → arbitrary YAML/JSON value.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub home_dir: String, // normalized to an absolute path on load
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub timeout_sec: u64,
}

/// Either a full `url` or discrete Postgres connection parts.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dbname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sslmode: Option<String>,
    pub max_conns: Option<u32>,
    #[serde(default)]
    pub acquire_timeout_sec: Option<u64>,
}

impl DatabaseConfig {
    /// Connection string for the store. `url` wins over the discrete parts.
    pub fn dsn(&self) -> Result<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return Ok(url.to_string());
        }

        let host = required(&self.host, "database.host")?;
        let user = required(&self.user, "database.user")?;
        let dbname = required(&self.dbname, "database.dbname")?;
        let port = self.port.unwrap_or(5432);

        let credentials = match self.password.as_deref() {
            Some(pw) if !pw.is_empty() => format!(
                "{}:{}",
                urlencoding::encode(user),
                urlencoding::encode(pw)
            ),
            _ => urlencoding::encode(user).into_owned(),
        };

        let mut dsn = format!(
            "postgres://{credentials}@{host}:{port}/{}",
            urlencoding::encode(dbname)
        );
        if let Some(mode) = self.sslmode.as_deref().filter(|m| !m.is_empty()) {
            dsn.push_str("?sslmode=");
            dsn.push_str(mode);
        }
        Ok(dsn)
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("{key} is required when database.url is not set"),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// `host:port` or a full `redis://` URL.
    pub addr: String,
}

impl CacheConfig {
    pub fn url(&self) -> String {
        if self.addr.contains("://") {
            self.addr.clone()
        } else {
            format!("redis://{}", self.addr)
        }
    }
}

/// Logging configuration: section name → settings.
/// "default" covers every target without a section of its own.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/api.log"; empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // Empty => $HOME/.notebook (or %APPDATA%/.notebook)
            home_dir: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            timeout_sec: 0,
        }
    }
}

pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/notebook.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: Some(DatabaseConfig {
                url: Some("sqlite://database/notebook.db".to_string()),
                max_conns: Some(10),
                ..DatabaseConfig::default()
            }),
            cache: None,
            logging: Some(default_logging_config()),
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Layered load: defaults → YAML file → `APP__*` environment variables.
    /// `server.home_dir` is normalized and created.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let path = config_path.as_ref();
        if !path.is_file() {
            bail!("config file not found: {}", path.display());
        }

        // Optional sections stay None unless the file or env provides them;
        // the database falls back to the default store after extraction.
        let base = AppConfig {
            server: ServerConfig::default(),
            database: None,
            cache: None,
            logging: None,
            modules: HashMap::new(),
        };

        let mut config: AppConfig = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(path))
            // APP__SERVER__PORT=9000 maps to server.port
            .merge(Env::prefixed("APP__").split("__"))
            .extract()
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        // Layering the default url would shadow discrete host/user parts.
        if config.database.is_none() {
            config.database = AppConfig::default().database;
        }

        normalize_home_dir_inplace(&mut config.server)?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => {
                let mut c = Self::default();
                normalize_home_dir_inplace(&mut c.server)?;
                Ok(c)
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("failed to serialize config to YAML")
    }

    pub fn home_dir(&self) -> PathBuf {
        PathBuf::from(&self.server.home_dir)
    }

    /// Deserialize `modules.<name>`; a missing section yields `T::default()`.
    pub fn module_config<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.modules.get(name) {
            None => Ok(T::default()),
            Some(raw) => serde_json::from_value(raw.clone())
                .with_context(|| format!("invalid config for module '{name}'")),
        }
    }

    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if args.mock {
            self.database = Some(DatabaseConfig {
                url: Some(MOCK_DATABASE_URL.to_string()),
                max_conns: Some(1),
                ..DatabaseConfig::default()
            });
            self.cache = None;
        }

        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }
}

/// Command line arguments relevant to configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config: Option<String>,
    pub port: Option<u16>,
    pub print_config: bool,
    pub verbose: u8,
    pub mock: bool,
}

fn normalize_home_dir_inplace(server: &mut ServerConfig) -> Result<()> {
    let configured = if server.home_dir.trim().is_empty() {
        None
    } else {
        Some(server.home_dir.clone())
    };

    let resolved = resolve_home_dir(configured, DEFAULT_SUBDIR, true)
        .context("failed to resolve server.home_dir")?;
    server.home_dir = resolved.to_string_lossy().to_string();
    Ok(())
}
