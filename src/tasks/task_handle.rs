//! Cancellable handle for spawned background work

use std::future::Future;
use tokio::task::AbortHandle;

/// Owns a spawned task and aborts it on `cancel` or drop.
///
/// Cancelling is idempotent; cancelling a finished or empty handle does nothing.
#[derive(Debug, Default)]
pub struct TaskHandle {
    abort: Option<AbortHandle>,
}

impl TaskHandle {
    /// Spawn `future` on the current tokio runtime
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let join = tokio::spawn(future);
        Self { abort: Some(join.abort_handle()) }
    }

    pub fn cancel(&mut self) {
        if let Some(abort) = self.abort.take() {
            abort.abort();
        }
    }

    /// True while the task has been spawned and has neither finished nor been cancelled
    pub fn is_active(&self) -> bool {
        self.abort.as_ref().map(|a| !a.is_finished()).unwrap_or(false)
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
