//! Positional templates (`{0}`, `{1}`, ...) and the three-template set used
//! to render a ticket sheet.
//!
//! `{{` and `}}` produce literal braces, so stylesheets embedded in a
//! template must double their braces.

use crate::error::{Result, TemplateError};
use crate::types::{Epic, Story, SubTask};
use std::path::Path;

pub const MAIN_TEMPLATE: &str = "main.html";
pub const STORY_TEMPLATE: &str = "story.html";
pub const TASK_TEMPLATE: &str = "task.html";

/// Values: story blocks, generation timestamp.
pub const MAIN_ARITY: usize = 2;
/// Values: id, name, lead BA, lead tester, remaining estimate, epic color,
/// epic name, subtask blocks, epic id.
pub const STORY_ARITY: usize = 9;
/// Values: id, name, type, estimate.
pub const TASK_ARITY: usize = 4;

const EMBEDDED_MAIN: &str = include_str!("../templates/main.html");
const EMBEDDED_STORY: &str = include_str!("../templates/story.html");
const EMBEDDED_TASK: &str = include_str!("../templates/task.html");

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Slot(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse `source`, rejecting any placeholder index `>= arity`.
    pub fn parse(
        name: impl Into<String>,
        source: &str,
        arity: usize,
    ) -> std::result::Result<Self, TemplateError> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' if chars.peek().map(|(_, n)| *n) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, n)| *n) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut text = String::new();
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        text.push(n);
                    }
                    if !closed {
                        return Err(TemplateError::UnmatchedBrace {
                            name,
                            brace: '{',
                            offset,
                        });
                    }
                    let index: usize =
                        text.trim().parse().map_err(|_| TemplateError::BadPlaceholder {
                            name: name.clone(),
                            text: text.clone(),
                            offset,
                        })?;
                    if index >= arity {
                        return Err(TemplateError::IndexOutOfRange { name, index, arity });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(index));
                }
                '}' => {
                    return Err(TemplateError::UnmatchedBrace {
                        name,
                        brace: '}',
                        offset,
                    });
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Whether placeholder `{index}` appears anywhere in the template.
    pub fn uses(&self, index: usize) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Slot(i) if *i == index))
    }

    /// Substitute `values` positionally. Absent values (and indices past the
    /// end of `values`) render as empty text.
    pub fn render(&self, values: &[Option<&str>]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Slot(i) => {
                    if let Some(Some(v)) = values.get(*i) {
                        out.push_str(v);
                    }
                }
            }
        }
        out
    }
}

/// Escape the five HTML-significant characters in a field value.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn escaped(value: Option<&str>) -> Option<String> {
    value.map(escape_html)
}

// ---------------------------------------------------------------------------
// TemplateSet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TemplateSet {
    main: Template,
    story: Template,
    task: Template,
}

impl TemplateSet {
    pub fn embedded() -> std::result::Result<Self, TemplateError> {
        Ok(Self {
            main: Template::parse(MAIN_TEMPLATE, EMBEDDED_MAIN, MAIN_ARITY)?,
            story: Template::parse(STORY_TEMPLATE, EMBEDDED_STORY, STORY_ARITY)?,
            task: Template::parse(TASK_TEMPLATE, EMBEDDED_TASK, TASK_ARITY)?,
        })
    }

    /// Load templates from `dir`, falling back to the embedded copy for any
    /// file the directory does not provide.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let Some(dir) = dir else {
            return Ok(Self::embedded()?);
        };
        let read = |file: &str, fallback: &str, arity: usize| -> Result<Template> {
            let path = dir.join(file);
            let source = if path.is_file() {
                tracing::debug!(path = %path.display(), "using template override");
                std::fs::read_to_string(&path)?
            } else {
                fallback.to_string()
            };
            Ok(Template::parse(file, &source, arity)?)
        };
        Ok(Self {
            main: read(MAIN_TEMPLATE, EMBEDDED_MAIN, MAIN_ARITY)?,
            story: read(STORY_TEMPLATE, EMBEDDED_STORY, STORY_ARITY)?,
            task: read(TASK_TEMPLATE, EMBEDDED_TASK, TASK_ARITY)?,
        })
    }

    pub fn render_subtask(&self, subtask: &SubTask) -> String {
        let id = escape_html(&subtask.id);
        let name = escape_html(&subtask.name);
        let kind = escaped(subtask.kind.as_deref());
        let estimate = escaped(subtask.estimate.as_deref());
        self.task.render(&[
            Some(id.as_str()),
            Some(name.as_str()),
            kind.as_deref(),
            estimate.as_deref(),
        ])
    }

    /// Render one story card. Subtask blocks are embedded only when the
    /// story has more than one subtask.
    pub fn render_story(&self, story: &Story, epic: &Epic, subtasks: &[SubTask]) -> String {
        let subtask_html: String = if subtasks.len() > 1 {
            subtasks.iter().map(|s| self.render_subtask(s)).collect()
        } else {
            String::new()
        };

        let id = escape_html(&story.id);
        let name = escape_html(&story.name);
        let lead_ba = escaped(story.lead_ba.as_deref());
        let lead_tester = escaped(story.lead_tester.as_deref());
        let estimate = escaped(story.remaining_estimate.as_deref());
        let color = escaped(epic.color.as_deref());
        let epic_name = escape_html(&epic.name);
        let epic_id = escaped(epic.id.as_deref());

        self.story.render(&[
            Some(id.as_str()),
            Some(name.as_str()),
            lead_ba.as_deref(),
            lead_tester.as_deref(),
            estimate.as_deref(),
            color.as_deref(),
            Some(epic_name.as_str()),
            Some(subtask_html.as_str()),
            epic_id.as_deref(),
        ])
    }

    pub fn render_document(&self, body: &str, generated_at: &str) -> String {
        let generated_at = escape_html(generated_at);
        self.main.render(&[Some(body), Some(generated_at.as_str())])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
