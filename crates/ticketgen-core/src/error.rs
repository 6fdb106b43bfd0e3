use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("config not found: run 'ticketgen init' or pass --config")]
    ConfigNotFound,

    #[error("config file does not exist: {0}")]
    ConfigMissing(PathBuf),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("generation worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;

/// Failure to retrieve one item from the tracker.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {id} failed: {message}")]
    Transport { id: String, message: String },

    #[error("request for {id} returned HTTP {status}")]
    Status { id: String, status: u16 },

    #[error("response for {id} is not a valid document: {source}")]
    Parse {
        id: String,
        #[source]
        source: DocumentError,
    },

    #[error("{id} already failed earlier in this run: {message}")]
    Earlier { id: String, message: String },
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("xml error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{id}: required field missing at {path}")]
    MissingField { id: String, path: String },

    #[error("{id}: {source}")]
    Path {
        id: String,
        #[source]
        source: DocumentError,
    },

    #[error("{id} already failed to decode earlier in this run: {message}")]
    Earlier { id: String, message: String },
}

/// Why one ticket could not be rendered.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("template '{name}': unmatched '{brace}' at offset {offset}")]
    UnmatchedBrace {
        name: String,
        brace: char,
        offset: usize,
    },

    #[error("template '{name}': bad placeholder '{{{text}}}' at offset {offset}")]
    BadPlaceholder {
        name: String,
        text: String,
        offset: usize,
    },

    #[error("template '{name}': placeholder {{{index}}} exceeds the {arity} available values")]
    IndexOutOfRange {
        name: String,
        index: usize,
        arity: usize,
    },
}

#[derive(Debug, Error)]
#[error("could not write {path}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Error)]
#[error("could not open {path} with {viewer}: {source}")]
pub struct LaunchError {
    pub path: PathBuf,
    pub viewer: String,
    #[source]
    pub source: std::io::Error,
}
