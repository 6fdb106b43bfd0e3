pub mod cancel;
pub mod config;
pub mod decode;
pub mod document;
pub mod epic_cache;
pub mod error;
pub mod fetch;
pub mod fields;
pub mod generator;
pub mod io;
pub mod paths;
pub mod progress;
pub mod template;
pub mod types;
pub mod viewer;
pub mod worker;

pub use error::{GenError, Result};
