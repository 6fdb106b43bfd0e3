use anyhow::Context;
use std::path::{Path, PathBuf};
use ticketgen_core::config::Config;
use ticketgen_core::paths;

fn cwd() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Where `init` should write: the explicit path, else `./ticketgen.yaml`.
pub fn init_target(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cwd().join(paths::CONFIG_FILE))
}

/// Find and load the config, returning its path alongside.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<(PathBuf, Config)> {
    let path = paths::find_config(explicit, &cwd())?;
    let config = Config::load(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok((path, config))
}
