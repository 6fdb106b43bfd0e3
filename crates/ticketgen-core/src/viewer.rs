use crate::error::LaunchError;
use std::path::Path;

/// Opens a finished report. Fire-and-forget: the call returns once the
/// viewer has been started.
pub trait Viewer {
    fn open(&self, path: &Path) -> Result<(), LaunchError>;
}

/// Opens with a configured command, or the platform default handler.
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    command: Option<String>,
}

impl SystemViewer {
    pub fn new(command: Option<String>) -> Self {
        Self {
            command: command.filter(|c| !c.trim().is_empty()),
        }
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }
}

impl Viewer for SystemViewer {
    fn open(&self, path: &Path) -> Result<(), LaunchError> {
        let result = match self.command() {
            Some(app) => open::with_detached(path, app),
            None => open::that_detached(path),
        };
        result.map_err(|source| LaunchError {
            path: path.to_path_buf(),
            viewer: self.command().unwrap_or("the default viewer").to_string(),
            source,
        })
    }
}
