//! The generation run: fetch every requested story with its epic and
//! subtasks, render a card per story, and write one HTML sheet.
//!
//! ```text
//! for each ticket (in order, stopping at the first empty token):
//!     checkpoint → story      (fetch + decode)
//!     checkpoint → epic       (EpicCache, fetch only on miss)
//!     checkpoint → subtasks   (fetch + decode each, in order)
//!     render story card → accumulator
//! render main document → write → open viewer
//! ```
//!
//! A failing ticket is reported and skipped; only cancellation or the empty
//! token ends the loop early. Nothing in a run returns an error to the
//! caller: every failure becomes a progress fragment and a field of the
//! [`RunReport`].

use crate::cancel::CancelToken;
use crate::decode::{fetch_story, fetch_subtask};
use crate::epic_cache::EpicCache;
use crate::error::{ItemError, WriteError};
use crate::fetch::ItemSource;
use crate::fields::FieldMap;
use crate::io::atomic_write;
use crate::paths::{artifact_name, executable_dir};
use crate::progress::{self, ProgressSink};
use crate::template::TemplateSet;
use crate::types::{normalize_id, RunState};
use crate::viewer::Viewer;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFailure {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub state: RunState,
    /// Ticket ids whose cards made it into the output, in input order.
    pub rendered: Vec<String>,
    pub failed: Vec<TicketFailure>,
    pub epic_fetches: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_error: Option<String>,
}

impl RunReport {
    fn new() -> Self {
        Self {
            state: RunState::Running,
            rendered: Vec::new(),
            failed: Vec::new(),
            epic_fetches: 0,
            output: None,
            write_error: None,
            launch_error: None,
        }
    }

    /// One-line human summary, e.g. "3 rendered, 1 failed (completed)".
    pub fn summary(&self) -> String {
        format!(
            "{} rendered, {} failed ({})",
            self.rendered.len(),
            self.failed.len(),
            self.state
        )
    }
}

/// Result of one ticket's pass through the pipeline.
#[derive(Debug)]
pub enum TicketOutcome {
    Rendered(String),
    Cancelled,
    Failed(ItemError),
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

pub struct Generator<S> {
    source: S,
    fields: FieldMap,
    templates: TemplateSet,
    output_dir: PathBuf,
    viewer: Option<Box<dyn Viewer + Send>>,
    state: RunState,
}

impl<S: ItemSource> Generator<S> {
    /// A generator writing next to the executable, with the default field
    /// map and no viewer.
    pub fn new(source: S, templates: TemplateSet) -> Self {
        Self {
            source,
            fields: FieldMap::default(),
            templates,
            output_dir: executable_dir(),
            viewer: None,
            state: RunState::Idle,
        }
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_viewer(mut self, viewer: impl Viewer + Send + 'static) -> Self {
        self.viewer = Some(Box::new(viewer));
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the whole pipeline over `tickets`.
    ///
    /// The epic cache lives for exactly this call.
    pub fn run(
        &mut self,
        tickets: &[String],
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> RunReport {
        self.state = RunState::Running;
        info!(tickets = tickets.len(), "generation started");

        let mut cache = EpicCache::new();
        let mut blocks: Vec<String> = Vec::new();
        let mut report = RunReport::new();
        let mut final_state = RunState::Completed;

        for (index, raw) in tickets.iter().enumerate() {
            let id = normalize_id(raw);
            if id.is_empty() {
                debug!(index, "empty ticket id, stopping");
                break;
            }
            if index > 0 {
                progress.report(progress::SEPARATOR);
            }

            match self.process_ticket(&id, &mut cache, progress, cancel) {
                TicketOutcome::Rendered(html) => {
                    blocks.push(html);
                    report.rendered.push(id);
                    progress.report(progress::DONE);
                }
                TicketOutcome::Cancelled => {
                    info!(ticket = %id, "generation cancelled");
                    progress.report(progress::CANCELLED);
                    final_state = RunState::Cancelled;
                    break;
                }
                TicketOutcome::Failed(err) => {
                    warn!(ticket = %id, error = %err, "ticket failed");
                    progress.report(&progress::ticket_failed(&err));
                    report.failed.push(TicketFailure {
                        id,
                        message: err.to_string(),
                    });
                }
            }
        }

        report.epic_fetches = cache.fetches();
        self.write_output(&blocks, progress, &mut report);

        self.state = final_state;
        report.state = final_state;
        info!(summary = %report.summary(), "generation finished");
        report
    }

    /// Tagged wrapper over [`Generator::try_ticket`].
    pub fn process_ticket(
        &self,
        id: &str,
        cache: &mut EpicCache,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> TicketOutcome {
        match self.try_ticket(id, cache, progress, cancel) {
            Ok(Some(html)) => TicketOutcome::Rendered(html),
            Ok(None) => TicketOutcome::Cancelled,
            Err(err) => TicketOutcome::Failed(err),
        }
    }

    /// `Ok(None)` when a checkpoint observed cancellation.
    fn try_ticket(
        &self,
        id: &str,
        cache: &mut EpicCache,
        progress: &mut dyn ProgressSink,
        cancel: &CancelToken,
    ) -> Result<Option<String>, ItemError> {
        if cancel.is_cancelled() {
            return Ok(None);
        }
        progress.report(&progress::processing_story(id));
        let story = fetch_story(&self.source, id, &self.fields.story)?;

        if cancel.is_cancelled() {
            return Ok(None);
        }
        progress.report(progress::PROCESSING_EPIC);
        let epic = cache.resolve(story.epic_id.as_deref(), &self.source, &self.fields.epic)?;

        if cancel.is_cancelled() {
            return Ok(None);
        }
        progress.report(progress::PROCESSING_SUBTASKS);
        let subtasks = story
            .subtask_ids
            .iter()
            .map(|sub_id| fetch_subtask(&self.source, sub_id, &self.fields.subtask))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(self.templates.render_story(&story, &epic, &subtasks)))
    }

    fn write_output(
        &self,
        blocks: &[String],
        progress: &mut dyn ProgressSink,
        report: &mut RunReport,
    ) {
        if blocks.is_empty() {
            progress.report(progress::NOTHING_GENERATED);
            return;
        }

        let now = Local::now();
        let path = self.output_dir.join(artifact_name(&now));
        let html = self
            .templates
            .render_document(&blocks.concat(), &now.format("%Y-%m-%d %H:%M").to_string());

        if let Err(source) = atomic_write(&path, html.as_bytes()) {
            let err = WriteError { path, source };
            warn!(error = %err, "could not write report");
            progress.report(&progress::write_failed(&err));
            report.write_error = Some(err.to_string());
            return;
        }

        info!(path = %path.display(), cards = blocks.len(), "report written");
        progress.report(&progress::all_generated(&path));
        report.output = Some(path.clone());

        if let Some(viewer) = &self.viewer {
            if let Err(err) = viewer.open(&path) {
                warn!(error = %err, "could not open report");
                progress.report(&progress::launch_failed(&err));
                report.launch_error = Some(err.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
