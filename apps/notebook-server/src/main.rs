use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use api_ingress::{ApiIngress, ApiIngressConfig};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use notebook::{Notebook, NotebookConfig};
use notebook_db::{ConnectOpts, DbHandle, RedisCache};
use runtime::{AppConfig, CliArgs};

mod health;
mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps in-memory DSNs as they are.
/// - Normalizes backslashes into forward slashes (important on Windows).
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String> {
    if !dsn.starts_with("sqlite:") {
        return Ok(dsn.to_string());
    }
    let Some(path_str) = notebook_db::sqlite_path(dsn) else {
        if dsn.contains(":memory:") || dsn.contains("mode=memory") {
            return Ok(dsn.to_string());
        }
        return Err(anyhow!("Empty SQLite path in DSN"));
    };
    let query = dsn.split_once('?').map(|(_, q)| q);

    let mut p = PathBuf::from(path_str);
    if p.is_relative() {
        p = base_dir.join(p);
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}

/// Notebook Server - users and notes over HTTP
#[derive(Parser)]
#[command(name = "notebook-server")]
#[command(about = "Notebook Server - users and notes over HTTP")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database and no cache
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

/// Everything the server needs, resolved and validated up front.
#[derive(Debug)]
struct Settings {
    dsn: String,
    connect: ConnectOpts,
    notebook: NotebookConfig,
    ingress: ApiIngressConfig,
    bind_addr: SocketAddr,
    media_root: Option<PathBuf>,
}

impl Settings {
    fn resolve(config: &AppConfig, port_override: Option<u16>) -> Result<Self> {
        let home = config.home_dir();

        let notebook: NotebookConfig = config.module_config("notebook")?;
        notebook.validate()?;

        let mut ingress: ApiIngressConfig = config.module_config("api_ingress")?;
        if config.server.timeout_sec > 0 {
            ingress.request_timeout_sec = config.server.timeout_sec;
        }

        let raw_addr = ingress
            .bind_addr
            .clone()
            .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));
        let mut bind_addr: SocketAddr = raw_addr
            .parse()
            .map_err(|e| anyhow!("Invalid bind address '{}': {}", raw_addr, e))?;
        if let Some(port) = port_override {
            bind_addr.set_port(port);
        }

        let media_root = Some(ingress.media_dir.trim())
            .filter(|dir| !dir.is_empty())
            .map(|dir| {
                let p = PathBuf::from(dir);
                if p.is_relative() {
                    home.join(p)
                } else {
                    p
                }
            });

        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("Database configuration is missing"))?;
        let dsn = db_config.dsn()?;
        DbHandle::detect(&dsn)?;
        let dsn = absolutize_sqlite_dsn(&dsn, &home)?;

        let connect = ConnectOpts {
            max_conns: db_config.max_conns,
            acquire_timeout: Some(Duration::from_secs(
                db_config.acquire_timeout_sec.unwrap_or(5),
            )),
            ..ConnectOpts::default()
        };

        Ok(Self {
            dsn,
            connect,
            notebook,
            ingress,
            bind_addr,
            media_root,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!("Notebook server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args.port).await,
        Commands::Check => check_config(&config, args.port),
    }
}

async fn run_server(config: AppConfig, port_override: Option<u16>) -> Result<()> {
    let settings = Settings::resolve(&config, port_override)?;

    tracing::info!(
        "Connecting to database: {}",
        notebook_db::redact_credentials_in_dsn(Some(&settings.dsn))
    );
    let db = DbHandle::connect(&settings.dsn, settings.connect.clone())
        .await
        .context("failed to connect to the database")?;
    tracing::info!(
        "Connected DB backend: {:?} ({})",
        db.engine(),
        db.redacted_dsn()
    );
    let db = Arc::new(db);

    let notebook = Notebook::init(db.clone(), settings.notebook.clone()).await?;

    let mut ingress = ApiIngress::new(settings.ingress.clone())
        .with_media_root(settings.media_root.clone())
        .mount(notebook.router(), Notebook::openapi())
        .health_check(Arc::new(health::DatabaseHealth(db.clone())));

    if let Some(cache_config) = &config.cache {
        match RedisCache::open(&cache_config.url()) {
            Ok(cache) => {
                match cache.ping().await {
                    Ok(()) => tracing::info!(addr = %cache_config.addr, "Cache reachable"),
                    Err(e) => {
                        tracing::warn!(addr = %cache_config.addr, error = %e, "Cache not reachable")
                    }
                }
                ingress = ingress.health_check(Arc::new(health::CacheHealth(cache)));
            }
            Err(e) => tracing::warn!(error = %e, "Invalid cache address; running without cache"),
        }
    }

    ingress
        .serve(&settings.bind_addr.to_string(), shutdown::signal())
        .await?;

    drop(ingress);
    drop(notebook);
    if let Ok(db) = Arc::try_unwrap(db) {
        db.close().await;
    }
    tracing::info!("Notebook server stopped");
    Ok(())
}

fn check_config(config: &AppConfig, port_override: Option<u16>) -> Result<()> {
    tracing::info!("Checking configuration...");

    let settings = Settings::resolve(config, port_override)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!(
        "Database: {}",
        notebook_db::redact_credentials_in_dsn(Some(&settings.dsn))
    );
    println!("Listening address: {}", settings.bind_addr);
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
