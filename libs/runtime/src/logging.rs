use crate::config::{LoggingConfig, Section};
use anyhow::{Context, Result};
use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use file_rotate::{
    compression::Compression,
    suffix::AppendCount,
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";

fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" | "" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn level_name(level: LevelFilter) -> String {
    level.to_string().to_ascii_lowercase()
}

/// Build `EnvFilter` directives from the config: the "default" section sets the
/// global level, every other section sets the level for its own target.
fn directives<F>(cfg: &LoggingConfig, level_of: F) -> String
where
    F: Fn(&Section) -> Option<&str>,
{
    let global = cfg
        .get(DEFAULT_SECTION)
        .and_then(&level_of)
        .map(parse_level)
        .unwrap_or(LevelFilter::OFF);

    let mut parts = vec![level_name(global)];
    let mut names: Vec<&String> = cfg.keys().filter(|k| *k != DEFAULT_SECTION).collect();
    names.sort();
    for name in names {
        if let Some(level) = level_of(&cfg[name]) {
            parts.push(format!("{name}={}", level_name(parse_level(level))));
        }
    }
    parts.join(",")
}

fn console_directives(cfg: &LoggingConfig) -> String {
    directives(cfg, |s| Some(s.console_level.as_str()))
}

fn file_directives(cfg: &LoggingConfig) -> String {
    directives(cfg, |s| {
        if s.file.trim().is_empty() {
            None
        } else {
            Some(s.file_level.as_str())
        }
    })
}

/// Returns true if target == crate_name or target starts with "crate_name::"
fn matches_crate_prefix(target: &str, crate_name: &str) -> bool {
    target == crate_name
        || target
            .strip_prefix(crate_name)
            .is_some_and(|rest| rest.starts_with("::"))
}

fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

// -------- rotating file sinks --------

#[derive(Clone)]
struct RotatingFile(Arc<Mutex<FileRotate<AppendCount>>>);

impl RotatingFile {
    fn open(path: &Path, section: &Section) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create log dir {}", parent.display()))?;
        }
        let max_bytes = section.max_size_mb.unwrap_or(100) * 1024 * 1024;
        let rot = FileRotate::new(
            path,
            AppendCount::new(section.max_backups.unwrap_or(3)),
            ContentLimit::BytesSurpassed(max_bytes as usize),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        Ok(Self(Arc::new(Mutex::new(rot))))
    }
}

/// A sink that is either a rotating file or a black hole.
struct Sink(Option<RotatingFile>);

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &self.0 {
            Some(file) => file
                .0
                .lock()
                .map_err(|_| std::io::Error::other("log file lock poisoned"))?
                .write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &self.0 {
            Some(file) => file
                .0
                .lock()
                .map_err(|_| std::io::Error::other("log file lock poisoned"))?
                .flush(),
            None => Ok(()),
        }
    }
}

/// Routes each event to the file of the most specific section matching its target.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<RotatingFile>,
    by_target: Vec<(String, RotatingFile)>,
}

impl FileRouter {
    fn from_config(cfg: &LoggingConfig, base_dir: &Path) -> Self {
        let mut router = FileRouter::default();
        for (name, section) in cfg {
            if section.file.trim().is_empty() {
                continue;
            }
            let path = resolve_log_path(&section.file, base_dir);
            match RotatingFile::open(&path, section) {
                Ok(file) if name == DEFAULT_SECTION => router.default = Some(file),
                Ok(file) => router.by_target.push((name.clone(), file)),
                // The subscriber is not installed yet, so stderr is the only channel.
                Err(e) => eprintln!("log file for '{name}' disabled: {e:#}"),
            }
        }
        // Longest prefix first so "a::b" wins over "a".
        router
            .by_target
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        router
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_target.is_empty()
    }

    fn resolve(&self, target: &str) -> Option<RotatingFile> {
        self.by_target
            .iter()
            .find(|(name, _)| matches_crate_prefix(target, name))
            .map(|(_, file)| file.clone())
            .or_else(|| self.default.clone())
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = Sink;

    fn make_writer(&'a self) -> Self::Writer {
        Sink(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        Sink(self.resolve(meta.target()))
    }
}

/// Install the global subscriber.
///
/// Console output honours `RUST_LOG` when it is set; otherwise the per-section
/// `console_level` values apply. File output is JSON, rotated by size, with
/// relative paths resolved against `base_dir` (normally `server.home_dir`).
/// Calling this more than once is a no-op.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    let _ = tracing_log::LogTracer::init();

    let console_filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(console_directives(cfg)));

    let console_layer = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(console_filter);

    let router = FileRouter::from_config(cfg, base_dir);
    let file_layer = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router)
            .with_filter(EnvFilter::new(file_directives(cfg)))
    });

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
