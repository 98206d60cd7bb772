//! Cancellable background task primitives.
//!
//! Every timer and staggered sequence in the runtime is a plain tokio task
//! wrapped in a [`TaskHandle`]. Cancellation aborts the task: a sequence
//! cancelled mid-sleep never runs its next step, and a timer cancelled after
//! firing is a no-op. Dropping the handle cancels the task, so an instance
//! that is torn down can never leave a timer running.

use std::future::Future;

use tokio::task::JoinHandle;

/// Handle to a cancellable background task.
#[derive(Debug)]
pub struct TaskHandle {
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Spawns the task onto the current tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            join: tokio::spawn(future),
        }
    }

    /// Cancels the task. Unconditional and non-blocking; cancelling a task
    /// that already finished or was already cancelled is a no-op.
    pub fn cancel(&self) {
        self.join.abort();
    }

    /// True once the task has run to completion or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}
