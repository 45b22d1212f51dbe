//! Notification fan-out to subscribers.
//!
//! The dispatcher is passive: it never decides whether a status is "news",
//! it pushes every resolved result to all current listeners synchronously.
//! Change detection and de-duplication belong to the receivers.

use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::model::JobStatus;

/// Receives every resolved job status.
///
/// A blanket impl covers plain closures, so
/// `dispatcher.subscribe(Arc::new(|status: &JobStatus| { ... }))` works.
pub trait StatusListener: Send + Sync {
    /// Called with each resolved status, on the notifying task.
    fn on_update(&self, status: &JobStatus);
}

impl<F> StatusListener for F
where
    F: Fn(&JobStatus) + Send + Sync,
{
    fn on_update(&self, status: &JobStatus) {
        self(status)
    }
}

/// Holds the subscriber set and pushes every result to all of them.
#[derive(Default)]
pub struct NotificationDispatcher {
    listeners: RwLock<Vec<Arc<dyn StatusListener>>>,
}

impl NotificationDispatcher {
    /// Create a dispatcher with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener. Safe to call while a notification is in progress;
    /// the new listener receives the next notification, not the in-flight
    /// one.
    pub fn subscribe(&self, listener: Arc<dyn StatusListener>) {
        let mut listeners = self.listeners.write().unwrap();
        listeners.push(listener);
    }

    /// Push a status to every current listener, synchronously, in
    /// unspecified order.
    pub fn notify(&self, status: &JobStatus) {
        let snapshot: Vec<Arc<dyn StatusListener>> = {
            let listeners = self.listeners.read().unwrap();
            listeners.clone()
        };

        trace!(listeners = snapshot.len(), %status, "Notifying listeners");
        for listener in &snapshot {
            listener.on_update(status);
        }
    }

    /// Number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        let listeners = self.listeners.read().unwrap();
        listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BuildResult, JobIdentity};
    use std::sync::Mutex;

    fn status(result: BuildResult) -> JobStatus {
        JobStatus::new(
            JobIdentity::new("PROJECT_1", "JOB_ID_1", "JOB_CATEGORY"),
            result,
            "user-1",
        )
    }

    #[test]
    fn test_notify_reaches_all_listeners() {
        let dispatcher = NotificationDispatcher::new();
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_b = Arc::new(Mutex::new(Vec::new()));

        let sink_a = Arc::clone(&seen_a);
        dispatcher.subscribe(Arc::new(move |s: &JobStatus| {
            sink_a.lock().unwrap().push(s.clone());
        }));
        let sink_b = Arc::clone(&seen_b);
        dispatcher.subscribe(Arc::new(move |s: &JobStatus| {
            sink_b.lock().unwrap().push(s.clone());
        }));

        dispatcher.notify(&status(BuildResult::Success));

        assert_eq!(seen_a.lock().unwrap().len(), 1);
        assert_eq!(seen_b.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_every_notification_is_pushed_even_when_unchanged() {
        let dispatcher = NotificationDispatcher::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe(Arc::new(move |s: &JobStatus| {
            sink.lock().unwrap().push(s.clone());
        }));

        // Same value twice: the dispatcher does not de-duplicate.
        dispatcher.notify(&status(BuildResult::Running));
        dispatcher.notify(&status(BuildResult::Running));

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_notifications() {
        let dispatcher = NotificationDispatcher::new();
        dispatcher.notify(&status(BuildResult::Success));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe(Arc::new(move |s: &JobStatus| {
            sink.lock().unwrap().push(s.clone());
        }));
        assert_eq!(dispatcher.listener_count(), 1);

        dispatcher.notify(&status(BuildResult::Failure));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].result, BuildResult::Failure);
    }
}
