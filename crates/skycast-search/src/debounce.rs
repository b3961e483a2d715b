//! Debounce primitive: collapse a burst of calls into one delayed action.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Delays an action until `window` has passed without another call.
///
/// At most one timer is pending at any time: every call cancels the
/// previous timer if it has not fired yet. Once a timer fires, its action
/// runs as a separate task and is never cancelled by later calls.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last_call: Option<Instant>,
    timer: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_call: None,
            timer: None,
        }
    }

    /// Schedule `action` to run once the quiet window elapses, replacing any
    /// pending action.
    pub fn call<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let now = Instant::now();

        if let Some(last) = self.last_call {
            let since = now.saturating_duration_since(last);
            if since < self.window {
                tracing::debug!("Call {:?} after previous one, rescheduling", since);
            }
        }
        self.cancel();

        self.last_call = Some(now);
        let deadline = now + self.window;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            tokio::spawn(action);
        }));
    }

    /// Drop the pending action, if any. Returns true if one was cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    /// True while a scheduled action has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    const WINDOW: Duration = Duration::from_millis(1000);

    fn push(sink: &Arc<Mutex<Vec<u32>>>, value: u32) -> impl Future<Output = ()> + Send + 'static {
        let sink = sink.clone();
        async move { sink.lock().push(value) }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_fires_once_with_last_action() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(WINDOW);

        for value in 1..=5 {
            debouncer.call(push(&fired, value));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(*fired.lock(), vec![5]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_does_not_fire_before_window() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.call(push(&fired, 1));
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(fired.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*fired.lock(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_each_fire() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(WINDOW);

        for value in 1..=3 {
            debouncer.call(push(&fired, value));
            tokio::time::sleep(Duration::from_millis(1200)).await;
        }
        assert_eq!(*fired.lock(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_fire() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.call(push(&fired, 1));
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(fired.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        {
            let mut debouncer = Debouncer::new(WINDOW);
            debouncer.call(push(&fired, 1));
        }
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(fired.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_call_does_not_abort_running_action() {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let mut debouncer = Debouncer::new(WINDOW);

        let sink = finished.clone();
        debouncer.call(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            sink.lock().push("slow");
        });

        // Timer fired at 1000ms; the action is still running.
        tokio::time::sleep(Duration::from_millis(1200)).await;
        let sink = finished.clone();
        debouncer.call(async move {
            sink.lock().push("next");
        });

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(*finished.lock(), vec!["slow", "next"]);
    }
}
