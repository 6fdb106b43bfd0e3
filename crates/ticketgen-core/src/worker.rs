use crate::cancel::CancelToken;
use crate::error::{GenError, Result};
use crate::fetch::ItemSource;
use crate::generator::{Generator, RunReport};
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;
use tracing::debug;

/// A generation run executing on its own thread.
///
/// Progress fragments arrive on [`RunHandle::progress`] in emission order;
/// the channel closes when the run finishes.
pub struct RunHandle {
    progress: Receiver<String>,
    cancel: CancelToken,
    handle: JoinHandle<RunReport>,
}

/// Start `generator` over `tickets` on a background thread.
pub fn spawn<S>(mut generator: Generator<S>, tickets: Vec<String>) -> Result<RunHandle>
where
    S: ItemSource + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    let handle = std::thread::Builder::new()
        .name("ticketgen-worker".into())
        .spawn(move || {
            let mut tx = tx;
            let report = generator.run(&tickets, &mut tx, &worker_cancel);
            debug!(state = %report.state, "worker exiting");
            report
        })?;

    Ok(RunHandle {
        progress: rx,
        cancel,
        handle,
    })
}

impl RunHandle {
    pub fn progress(&self) -> &Receiver<String> {
        &self.progress
    }

    /// A token that cancels this run; safe to move to another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the run to end. Undelivered progress is dropped.
    pub fn join(self) -> Result<RunReport> {
        self.handle.join().map_err(|_| GenError::WorkerPanicked)
    }
}
