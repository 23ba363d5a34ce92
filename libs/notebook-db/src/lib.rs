//! Connection handling for the relational store and the key-value cache.
//!
//! `DbHandle` owns one sqlx pool for either Postgres or SQLite; the engine is
//! picked from the DSN scheme. Repositories match on [`DbPool`] and run the
//! same SQL text against whichever pool is active.

pub mod cache;

pub use cache::{CacheError, RedisCache};

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{PgPool, SqlitePool};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    Sqlite,
}

#[derive(Clone, Debug)]
pub struct ConnectOpts {
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            create_sqlite_dirs: true,
        }
    }
}

#[derive(Clone, Debug)]
pub enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

#[derive(Clone, Debug)]
pub struct DbHandle {
    engine: DbEngine,
    pool: DbPool,
    dsn: String,
}

const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

impl DbHandle {
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();

        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        let pool = match engine {
            DbEngine::Postgres => {
                let mut o = PgPoolOptions::new();
                if let Some(n) = opts.max_conns {
                    o = o.max_connections(n);
                }
                if let Some(n) = opts.min_conns {
                    o = o.min_connections(n);
                }
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }
                if let Some(t) = opts.idle_timeout {
                    o = o.idle_timeout(t);
                }
                DbPool::Postgres(o.connect(dsn).await?)
            }
            DbEngine::Sqlite => {
                let mut o = SqlitePoolOptions::new();
                if let Some(t) = opts.acquire_timeout {
                    o = o.acquire_timeout(t);
                }

                let connect_opts = if is_sqlite_memory(dsn) {
                    // Every connection to ":memory:" is a separate database, so the
                    // pool holds exactly one connection and never recycles it.
                    o = o
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None);
                    SqliteConnectOptions::from_str(dsn)?
                } else {
                    if opts.create_sqlite_dirs {
                        create_sqlite_parent_dir(dsn)?;
                    }
                    if let Some(n) = opts.max_conns {
                        o = o.max_connections(n);
                    }
                    if let Some(t) = opts.idle_timeout {
                        o = o.idle_timeout(t);
                    }
                    SqliteConnectOptions::from_str(dsn)?
                        .create_if_missing(true)
                        .journal_mode(SqliteJournalMode::Wal)
                        .busy_timeout(SQLITE_BUSY_TIMEOUT)
                };

                DbPool::Sqlite(o.connect_with(connect_opts).await?)
            }
        };

        tracing::debug!(
            engine = ?engine,
            dsn = %redact_credentials_in_dsn(Some(dsn)),
            "database pool ready"
        );

        Ok(Self {
            engine,
            pool,
            dsn: dsn.to_string(),
        })
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// DSN with the password masked, safe for logs.
    pub fn redacted_dsn(&self) -> String {
        redact_credentials_in_dsn(Some(&self.dsn))
    }

    /// Round-trip a trivial statement.
    pub async fn ping(&self) -> Result<()> {
        match &self.pool {
            DbPool::Postgres(p) => {
                sqlx::query("SELECT 1").execute(p).await?;
            }
            DbPool::Sqlite(p) => {
                sqlx::query("SELECT 1").execute(p).await?;
            }
        }
        Ok(())
    }

    /// Run `statements` in order inside one transaction.
    pub async fn execute_batch(&self, statements: &[&str]) -> Result<()> {
        match &self.pool {
            DbPool::Postgres(p) => {
                let mut tx = p.begin().await?;
                for &stmt in statements {
                    sqlx::query(stmt).execute(&mut *tx).await?;
                }
                tx.commit().await?;
            }
            DbPool::Sqlite(p) => {
                let mut tx = p.begin().await?;
                for &stmt in statements {
                    sqlx::query(stmt).execute(&mut *tx).await?;
                }
                tx.commit().await?;
            }
        }
        Ok(())
    }

    pub async fn close(self) {
        match self.pool {
            DbPool::Postgres(p) => p.close().await,
            DbPool::Sqlite(p) => p.close().await,
        }
    }
}

fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

/// Filesystem path of a file-backed SQLite DSN, without the query string.
pub fn sqlite_path(dsn: &str) -> Option<&str> {
    let rest = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty() && !is_sqlite_memory(path)).then_some(path)
}

fn create_sqlite_parent_dir(dsn: &str) -> Result<()> {
    if let Some(parent) = sqlite_path(dsn).and_then(|p| Path::new(p).parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Mask the password of a URL-shaped DSN.
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => match url::Url::parse(dsn) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "***".to_string(),
        },
        Some(dsn) => dsn.to_string(),
        None => "none".to_string(),
    }
}
