use serde::{Deserialize, Serialize};

/// Display name used for stories that are not linked to any epic.
pub const NO_EPIC_NAME: &str = "No Epic";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Normalized ticket identifier (trimmed, upper-case).
    pub id: String,
    pub name: String,
    pub lead_ba: Option<String>,
    pub lead_tester: Option<String>,
    pub remaining_estimate: Option<String>,
    pub epic_id: Option<String>,
    /// Subtask identifiers in source order.
    pub subtask_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epic {
    /// `None` only for the placeholder returned for stories without an epic.
    pub id: Option<String>,
    pub name: String,
    pub color: Option<String>,
}

impl Epic {
    pub fn placeholder() -> Self {
        Self {
            id: None,
            name: NO_EPIC_NAME.to_string(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub name: String,
    pub kind: Option<String>,
    pub estimate: Option<String>,
}

/// Lifecycle of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl RunState {
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim and upper-case a caller-supplied ticket identifier.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Split a comma-separated ticket list as typed by the user.
///
/// Tokens are kept verbatim (including empty ones) so the generator can
/// apply its empty-token stop rule.
pub fn split_ticket_list(input: &str) -> Vec<String> {
    input.split(',').map(str::to_string).collect()
}
