use crate::error::{GenError, Result};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "ticketgen.yaml";
pub const ARTIFACT_PREFIX: &str = "tickets_";
pub const ARTIFACT_EXT: &str = "html";

/// `tickets_<YYYYMMDDHHMMSS>.html` for the given generation time.
pub fn artifact_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{ARTIFACT_PREFIX}{}.{ARTIFACT_EXT}",
        at.format("%Y%m%d%H%M%S")
    )
}

/// Directory holding the running executable, or `.` when it can't be found.
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Locate the config file.
///
/// Priority:
/// 1. `explicit` (`--config` flag / `TICKETGEN_CONFIG`), which must exist
/// 2. Walk upward from `cwd` looking for `ticketgen.yaml`
/// 3. `~/ticketgen.yaml`
pub fn find_config(explicit: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if let Some(p) = explicit {
        if p.is_file() {
            return Ok(p.to_path_buf());
        }
        return Err(GenError::ConfigMissing(p.to_path_buf()));
    }

    let mut dir = Some(cwd);
    while let Some(d) = dir {
        let candidate = d.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        dir = d.parent();
    }

    if let Some(home) = home::home_dir() {
        let candidate = home.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(GenError::ConfigNotFound)
}

/// Resolve `path` against `base` unless it is already absolute.
pub fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
