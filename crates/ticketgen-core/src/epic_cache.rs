use crate::decode::fetch_epic;
use crate::error::{DecodeError, FetchError, ItemError};
use crate::fetch::ItemSource;
use crate::fields::EpicFields;
use crate::types::Epic;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// How an epic failed the first time it was requested.
#[derive(Debug, Clone)]
enum Failure {
    Fetch(String),
    Decode(String),
}

impl Failure {
    fn of(err: &ItemError) -> Self {
        match err {
            ItemError::Fetch(e) => Failure::Fetch(e.to_string()),
            ItemError::Decode(e) => Failure::Decode(e.to_string()),
        }
    }

    /// Replay the failure for a later request, keeping its kind.
    fn replay(&self, id: &str) -> ItemError {
        let id = id.to_string();
        match self {
            Failure::Fetch(message) => FetchError::Earlier {
                id,
                message: message.clone(),
            }
            .into(),
            Failure::Decode(message) => DecodeError::Earlier {
                id,
                message: message.clone(),
            }
            .into(),
        }
    }
}

/// Per-run memo of decoded epics. Grows only; one fetch per distinct id.
///
/// Owned by the single worker for the length of a run, so it carries no
/// locking. Running tickets in parallel would need a coalescing lock per
/// epic id in front of `entries`.
#[derive(Debug)]
pub struct EpicCache {
    entries: HashMap<String, Arc<Epic>>,
    failed: HashMap<String, Failure>,
    placeholder: Arc<Epic>,
    fetches: usize,
}

impl Default for EpicCache {
    fn default() -> Self {
        Self::new()
    }
}

impl EpicCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            failed: HashMap::new(),
            placeholder: Arc::new(Epic::placeholder()),
            fetches: 0,
        }
    }

    /// Return the epic for `epic_id`, fetching it on first use.
    ///
    /// An absent or empty id yields the "no epic" placeholder without
    /// touching the source or the cache. A failure is remembered and
    /// reported again, as the same kind of error, without another request.
    pub fn resolve(
        &mut self,
        epic_id: Option<&str>,
        source: &dyn ItemSource,
        fields: &EpicFields,
    ) -> Result<Arc<Epic>, ItemError> {
        let Some(id) = epic_id.filter(|id| !id.is_empty()) else {
            return Ok(Arc::clone(&self.placeholder));
        };

        if let Some(epic) = self.entries.get(id) {
            debug!(epic = %id, "epic cache hit");
            return Ok(Arc::clone(epic));
        }

        if let Some(failure) = self.failed.get(id) {
            return Err(failure.replay(id));
        }

        self.fetches += 1;
        match fetch_epic(source, id, fields) {
            Ok(epic) => {
                let epic = Arc::new(epic);
                self.entries.insert(id.to_string(), Arc::clone(&epic));
                Ok(epic)
            }
            Err(e) => {
                self.failed.insert(id.to_string(), Failure::of(&e));
                Err(e)
            }
        }
    }

    /// Number of fetches issued through this cache, failed ones included.
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}
