//! Owned XML element tree and the small path language used to read fields
//! out of tracker responses.
//!
//! Paths are absolute and slash-separated. Each step names an element and
//! may carry one attribute filter:
//!
//! ```text
//! /rss/channel/item/summary
//! /rss/channel/item/customfields/customfield[@id='customfield_10008']/customfieldvalues/customfieldvalue
//! ```

use crate::error::DocumentError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// All descendant text in document order, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    fn matches(&self, step: &Step) -> bool {
        if self.name != step.name {
            return false;
        }
        match &step.filter {
            None => true,
            Some((key, value)) => self.attr(key) == Some(value.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
}

impl Document {
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader.read_event().map_err(|e| DocumentError::Xml {
                position: reader.error_position() as u64,
                message: e.to_string(),
            })?;
            match event {
                Event::Start(ref e) => {
                    stack.push(start_element(e, &reader)?);
                }
                Event::Empty(ref e) => {
                    let element = start_element(e, &reader)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    // quick-xml already rejects mismatched end tags
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                Event::Text(ref t) => {
                    let text = t.unescape().map(|c| c.into_owned()).unwrap_or_else(|_| {
                        String::from_utf8_lossy(&t.clone().into_inner()).into_owned()
                    });
                    push_text(&mut stack, text);
                }
                Event::CData(t) => {
                    push_text(&mut stack, String::from_utf8_lossy(&t.into_inner()).into_owned());
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            return Err(DocumentError::Unclosed(open.name));
        }
        root.map(|root| Document { root }).ok_or(DocumentError::NoRoot)
    }

    /// Every element matching `path`, in document order.
    pub fn select_all(&self, path: &FieldPath) -> Vec<&Element> {
        let Some((first, rest)) = path.steps.split_first() else {
            return Vec::new();
        };
        if !self.root.matches(first) {
            return Vec::new();
        }
        let mut current = vec![&self.root];
        for step in rest {
            current = current
                .into_iter()
                .flat_map(|e| e.child_elements().filter(|c| c.matches(step)))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    pub fn select_first(&self, path: &FieldPath) -> Option<&Element> {
        self.select_all(path).into_iter().next()
    }

    /// Trimmed text of the first match, `None` when nothing matches.
    pub fn text_at(&self, path: &FieldPath) -> Option<String> {
        self.select_first(path).map(Element::text)
    }
}

fn start_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, DocumentError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| DocumentError::Xml {
            position: reader.buffer_position() as u64,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        attributes.push((key, value));
    }
    Ok(Element::new(name, attributes))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Text outside the root element is dropped. Inside it every run is kept,
/// whitespace included, so inline siblings keep their separators.
fn push_text(stack: &mut [Element], text: String) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Text(text));
    }
}

// ---------------------------------------------------------------------------
// FieldPath
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Step {
    name: String,
    filter: Option<(String, String)>,
}

/// A parsed, absolute element path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    raw: String,
    steps: Vec<Step>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, DocumentError> {
        let invalid = |reason: &str| DocumentError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let body = raw
            .strip_prefix('/')
            .ok_or_else(|| invalid("must start with '/'"))?;

        let mut steps = Vec::new();
        for segment in split_segments(body) {
            steps.push(parse_step(segment).map_err(|r| invalid(&r))?);
        }
        if steps.is_empty() {
            return Err(invalid("no elements named"));
        }
        Ok(Self {
            raw: raw.to_string(),
            steps,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split on '/' outside of `[...]` filters.
fn split_segments(body: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                out.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&body[start..]);
    out
}

fn parse_step(segment: &str) -> Result<Step, String> {
    let (name, filter) = match segment.find('[') {
        None => (segment, None),
        Some(open) => {
            let inner = segment[open + 1..]
                .strip_suffix(']')
                .ok_or_else(|| format!("unterminated filter in '{segment}'"))?;
            (&segment[..open], Some(parse_filter(inner)?))
        }
    };
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(format!("bad element name in '{segment}'"));
    }
    Ok(Step {
        name: name.to_string(),
        filter,
    })
}

fn parse_filter(inner: &str) -> Result<(String, String), String> {
    let expr = inner
        .strip_prefix('@')
        .ok_or_else(|| format!("filter '{inner}' must test an attribute (@name='value')"))?;
    let (key, value) = expr
        .split_once('=')
        .ok_or_else(|| format!("filter '{inner}' is missing '='"))?;
    let value = value.trim();
    let unquoted = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .ok_or_else(|| format!("filter value in '{inner}' must be quoted"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("filter '{inner}' has an empty attribute name"));
    }
    Ok((key.to_string(), unquoted.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
