//! Field-path table for the tracker's feed schema.
//!
//! Every path the decoders read lives here, so a schema change on the tracker
//! side is a config edit rather than a code change.

use crate::document::FieldPath;
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};

const ITEM: &str = "/rss/channel/item";

fn item(rest: &str) -> String {
    format!("{ITEM}/{rest}")
}

fn custom_field(id: &str) -> String {
    item(&format!(
        "customfields/customfield[@id='{id}']/customfieldvalues/customfieldvalue"
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryFields {
    #[serde(default = "default_summary")]
    pub name: String,
    #[serde(default = "default_lead_ba")]
    pub lead_ba: String,
    #[serde(default = "default_lead_tester")]
    pub lead_tester: String,
    #[serde(default = "default_remaining_estimate")]
    pub remaining_estimate: String,
    #[serde(default = "default_epic_link")]
    pub epic_link: String,
    #[serde(default = "default_subtasks")]
    pub subtasks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicFields {
    #[serde(default = "default_summary")]
    pub name: String,
    #[serde(default = "default_epic_color")]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTaskFields {
    #[serde(default = "default_summary")]
    pub name: String,
    #[serde(default = "default_type")]
    pub kind: String,
    #[serde(default = "default_time_estimate")]
    pub estimate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default)]
    pub story: StoryFields,
    #[serde(default)]
    pub epic: EpicFields,
    #[serde(default)]
    pub subtask: SubTaskFields,
}

fn default_summary() -> String {
    item("summary")
}

fn default_lead_ba() -> String {
    custom_field("customfield_10100")
}

fn default_lead_tester() -> String {
    custom_field("customfield_10101")
}

fn default_remaining_estimate() -> String {
    item("aggregatetimeremainingestimate")
}

fn default_epic_link() -> String {
    custom_field("customfield_10008")
}

fn default_subtasks() -> String {
    item("subtasks/subtask")
}

fn default_epic_color() -> String {
    custom_field("customfield_10010")
}

fn default_type() -> String {
    item("type")
}

fn default_time_estimate() -> String {
    item("timeestimate")
}

impl Default for StoryFields {
    fn default() -> Self {
        Self {
            name: default_summary(),
            lead_ba: default_lead_ba(),
            lead_tester: default_lead_tester(),
            remaining_estimate: default_remaining_estimate(),
            epic_link: default_epic_link(),
            subtasks: default_subtasks(),
        }
    }
}

impl Default for EpicFields {
    fn default() -> Self {
        Self {
            name: default_summary(),
            color: default_epic_color(),
        }
    }
}

impl Default for SubTaskFields {
    fn default() -> Self {
        Self {
            name: default_summary(),
            kind: default_type(),
            estimate: default_time_estimate(),
        }
    }
}

impl FieldMap {
    /// `(label, path)` for every entry, in a stable order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("story.name", self.story.name.as_str()),
            ("story.lead_ba", self.story.lead_ba.as_str()),
            ("story.lead_tester", self.story.lead_tester.as_str()),
            ("story.remaining_estimate", self.story.remaining_estimate.as_str()),
            ("story.epic_link", self.story.epic_link.as_str()),
            ("story.subtasks", self.story.subtasks.as_str()),
            ("epic.name", self.epic.name.as_str()),
            ("epic.color", self.epic.color.as_str()),
            ("subtask.name", self.subtask.name.as_str()),
            ("subtask.kind", self.subtask.kind.as_str()),
            ("subtask.estimate", self.subtask.estimate.as_str()),
        ]
    }

    /// Parse every path, returning the label and error for each bad entry.
    pub fn check(&self) -> Vec<(&'static str, DocumentError)> {
        self.entries()
            .into_iter()
            .filter_map(|(label, raw)| FieldPath::parse(raw).err().map(|e| (label, e)))
            .collect()
    }
}
