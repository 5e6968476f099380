use std::time::Duration;

use tokio::task::JoinHandle;

/// A navigation scheduled to happen after a display delay.
///
/// Dropping the handle aborts the pending task, so a torn-down request
/// never navigates.
#[derive(Debug)]
pub struct ScheduledNavigation {
    handle: JoinHandle<()>,
}

impl ScheduledNavigation {
    /// Runs `navigate(target)` once `delay` has elapsed. Must be called
    /// inside a tokio runtime.
    pub fn schedule<F>(delay: Duration, target: String, navigate: F) -> Self
    where
        F: FnOnce(String) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            navigate(target);
        });

        Self { handle }
    }

    /// Cancels the navigation if it has not fired yet
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScheduledNavigation {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
