//! Project fetched documents into [`Story`], [`Epic`] and [`SubTask`] records
//! using the configured field paths.

use crate::document::{Document, Element, FieldPath};
use crate::error::{DecodeError, ItemError};
use crate::fetch::ItemSource;
use crate::fields::{EpicFields, StoryFields, SubTaskFields};
use crate::types::{Epic, Story, SubTask};

struct Reader<'a> {
    id: &'a str,
    doc: &'a Document,
}

impl<'a> Reader<'a> {
    fn path(&self, raw: &str) -> Result<FieldPath, DecodeError> {
        FieldPath::parse(raw).map_err(|source| DecodeError::Path {
            id: self.id.to_string(),
            source,
        })
    }

    fn required(&self, raw: &str) -> Result<String, DecodeError> {
        let path = self.path(raw)?;
        self.doc
            .text_at(&path)
            .ok_or_else(|| DecodeError::MissingField {
                id: self.id.to_string(),
                path: path.to_string(),
            })
    }

    /// Missing or blank text both decode to `None`.
    fn optional(&self, raw: &str) -> Result<Option<String>, DecodeError> {
        let path = self.path(raw)?;
        Ok(self.doc.text_at(&path).filter(|t| !t.is_empty()))
    }

    fn list(&self, raw: &str) -> Result<Vec<String>, DecodeError> {
        let path = self.path(raw)?;
        Ok(self
            .doc
            .select_all(&path)
            .into_iter()
            .map(Element::text)
            .filter(|t| !t.is_empty())
            .collect())
    }
}

pub fn decode_story(id: &str, doc: &Document, fields: &StoryFields) -> Result<Story, DecodeError> {
    let r = Reader { id, doc };
    Ok(Story {
        id: id.to_string(),
        name: r.required(&fields.name)?,
        lead_ba: r.optional(&fields.lead_ba)?,
        lead_tester: r.optional(&fields.lead_tester)?,
        remaining_estimate: r.optional(&fields.remaining_estimate)?,
        epic_id: r.optional(&fields.epic_link)?,
        subtask_ids: r.list(&fields.subtasks)?,
    })
}

pub fn decode_epic(id: &str, doc: &Document, fields: &EpicFields) -> Result<Epic, DecodeError> {
    let r = Reader { id, doc };
    Ok(Epic {
        id: Some(id.to_string()),
        name: r.required(&fields.name)?,
        color: r.optional(&fields.color)?,
    })
}

pub fn decode_subtask(
    id: &str,
    doc: &Document,
    fields: &SubTaskFields,
) -> Result<SubTask, DecodeError> {
    let r = Reader { id, doc };
    Ok(SubTask {
        id: id.to_string(),
        name: r.required(&fields.name)?,
        kind: r.optional(&fields.kind)?,
        estimate: r.optional(&fields.estimate)?,
    })
}

pub fn fetch_story(
    source: &dyn ItemSource,
    id: &str,
    fields: &StoryFields,
) -> Result<Story, ItemError> {
    let doc = source.fetch(id)?;
    Ok(decode_story(id, &doc, fields)?)
}

pub fn fetch_epic(
    source: &dyn ItemSource,
    id: &str,
    fields: &EpicFields,
) -> Result<Epic, ItemError> {
    let doc = source.fetch(id)?;
    Ok(decode_epic(id, &doc, fields)?)
}

pub fn fetch_subtask(
    source: &dyn ItemSource,
    id: &str,
    fields: &SubTaskFields,
) -> Result<SubTask, ItemError> {
    let doc = source.fetch(id)?;
    Ok(decode_subtask(id, &doc, fields)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
