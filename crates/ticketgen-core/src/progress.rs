//! Progress fragments sent from the generator to whoever is watching.
//!
//! Fragments are appended verbatim to a live status display, so line breaks
//! are part of the text.

use std::fmt::Display;
use std::path::Path;
use std::sync::mpsc::Sender;

pub const SEPARATOR: &str = "\n";
pub const PROCESSING_EPIC: &str = "Processing epic... ";
pub const PROCESSING_SUBTASKS: &str = "Processing sub tasks... ";
pub const DONE: &str = "Done.";
pub const CANCELLED: &str = "\n\nCancelled!";
pub const NOTHING_GENERATED: &str = "\n\nNo tickets generated.";

pub fn processing_story(id: &str) -> String {
    format!("[{id}] Processing story... ")
}

pub fn ticket_failed(err: &dyn Display) -> String {
    format!("\n\nError: {err}\n")
}

pub fn all_generated(path: &Path) -> String {
    format!("\n\nAll tickets generated: {}", path.display())
}

pub fn write_failed(err: &dyn Display) -> String {
    format!("\n\nError writing output: {err}\n")
}

pub fn launch_failed(err: &dyn Display) -> String {
    format!("\n\nError opening viewer: {err}\n")
}

/// Receives progress fragments in order from a single producer.
pub trait ProgressSink {
    fn report(&mut self, fragment: &str);
}

impl ProgressSink for Sender<String> {
    fn report(&mut self, fragment: &str) {
        // a dropped receiver just means nobody is watching any more
        let _ = self.send(fragment.to_string());
    }
}

impl ProgressSink for Vec<String> {
    fn report(&mut self, fragment: &str) {
        self.push(fragment.to_string());
    }
}
