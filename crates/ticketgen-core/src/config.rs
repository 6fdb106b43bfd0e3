use crate::error::{GenError, Result};
use crate::fetch::HttpSource;
use crate::fields::FieldMap;
use crate::paths;
use crate::template::{Template, TemplateSet};
use crate::viewer::SystemViewer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

impl ConfigWarning {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

pub const DEFAULT_TASK_URL: &str = "https://jira.example.com/si/jira.issueviews:issue-xml/{0}/{0}.xml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Item URL with `{0}` standing for the ticket id.
    pub task_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub fields: FieldMap,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_URL, "")
    }
}

impl Config {
    pub fn new(task_url: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            task_url: task_url.into(),
            username: username.into(),
            password: None,
            output_dir: None,
            viewer: None,
            templates_dir: None,
            timeout_secs: default_timeout_secs(),
            fields: FieldMap::default(),
        }
    }

    /// Read `path`. Relative `output_dir` and `templates_dir` are taken
    /// relative to the file's own directory.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(GenError::ConfigMissing(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let mut cfg: Config = serde_yaml::from_str(&data)?;

        let base = path.parent().unwrap_or(Path::new("."));
        cfg.output_dir = cfg.output_dir.map(|p| paths::anchor(base, &p));
        cfg.templates_dir = cfg.templates_dir.map(|p| paths::anchor(base, &p));
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())?;
        Ok(())
    }

    /// Like [`Config::save`] but leaves an existing file alone.
    /// Returns whether the file was written.
    pub fn save_new(&self, path: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(self)?;
        Ok(crate::io::write_if_missing(path, data.as_bytes())?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured output directory, else the executable's directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(paths::executable_dir)
    }

    /// Build the HTTP item source. `password` overrides the stored one;
    /// with neither, an empty password is sent.
    pub fn http_source(&self, password: Option<&str>) -> Result<HttpSource> {
        let password = password.or(self.password.as_deref()).unwrap_or("");
        HttpSource::new(&self.task_url, &self.username, password, self.timeout())
    }

    pub fn templates(&self) -> Result<TemplateSet> {
        TemplateSet::load(self.templates_dir.as_deref())
    }

    pub fn viewer(&self) -> SystemViewer {
        SystemViewer::new(self.viewer.clone())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        match Template::parse("task_url", &self.task_url, 1) {
            Ok(t) if !t.uses(0) => warnings.push(ConfigWarning::error(format!(
                "task_url '{}' has no {{0}} placeholder for the ticket id",
                self.task_url
            ))),
            Ok(_) => {}
            Err(e) => warnings.push(ConfigWarning::error(e.to_string())),
        }

        if self.username.trim().is_empty() {
            warnings.push(ConfigWarning::warning(
                "username is empty; requests will carry blank credentials",
            ));
        }

        if self.password.is_none() {
            warnings.push(ConfigWarning::warning(
                "no password stored; pass --password or set TICKETGEN_PASSWORD",
            ));
        }

        for (label, err) in self.fields.check() {
            warnings.push(ConfigWarning::error(format!("fields.{label}: {err}")));
        }

        if let Some(cmd) = self.viewer.as_deref().filter(|c| !c.trim().is_empty()) {
            if which::which(cmd).is_err() {
                warnings.push(ConfigWarning::warning(format!(
                    "viewer '{cmd}' not found on PATH"
                )));
            }
        }

        if let Some(dir) = &self.templates_dir {
            if !dir.is_dir() {
                warnings.push(ConfigWarning::error(format!(
                    "templates_dir '{}' is not a directory",
                    dir.display()
                )));
            } else if let Err(e) = self.templates() {
                warnings.push(ConfigWarning::error(e.to_string()));
            }
        }

        if self.timeout_secs == 0 {
            warnings.push(ConfigWarning::warning(
                "timeout_secs is 0; requests will fail immediately",
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
