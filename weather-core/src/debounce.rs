//! Cancelable delayed task.
//!
//! Each [`Debouncer::schedule`] replaces whatever timer was pending, so a
//! burst of calls collapses into one run fired `delay` after the last call.
//! Only the timer is cancelable: once fired, the task runs detached.

use std::{future::Future, time::Duration};
use tokio::{runtime::Handle, task::JoinHandle};

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    /// Timer for the not-yet-fired task.
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Binds to the current tokio runtime; panics outside one, like `tokio::spawn`.
    pub fn new(delay: Duration) -> Self {
        Self::with_handle(delay, Handle::current())
    }

    /// Binds to an explicit runtime, for callers on non-runtime threads.
    pub fn with_handle(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            pending: None,
        }
    }

    /// Run `task` after the quiet period, canceling any earlier un-fired task.
    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        let runtime = self.runtime.clone();
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            runtime.spawn(task);
        }));
    }

    /// Drop the pending timer. Has no effect on a task that already fired.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
