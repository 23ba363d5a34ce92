use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory to an absolute path.
///
/// `None` selects `<platform home>/<default_subdir>`. A leading `~` is expanded
/// against the user's home directory and relative paths are taken from the
/// current working directory. With `create` set the directory is created.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        None => platform_home()?.join(default_subdir),
        Some(raw) => expand(&raw)?,
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("cannot read current directory")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("cannot create home dir {}", absolute.display()))?;
    }
    Ok(absolute)
}

fn expand(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    if raw.starts_with('~') {
        bail!("unsupported home dir form: {raw}");
    }
    Ok(Path::new(raw).to_path_buf())
}

fn platform_home() -> Result<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let home = dirs::home_dir();

    home.context("cannot determine the user's home directory")
}
