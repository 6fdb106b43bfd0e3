use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Latched, shareable cancellation flag.
///
/// Setting it never interrupts work in flight; the generator polls it at
/// fixed checkpoints between steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
