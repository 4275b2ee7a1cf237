//! Polling for newly scheduled tasks (technician view)
//!
//! The poller owns a [`ScheduledCountTracker`] inside one spawned task. Each
//! tick re-reads the number of newly scheduled tasks; only an increase raises
//! a notice. The task stops when its [`PollerHandle`] is shut down or dropped,
//! or when the backend rejects the session.

use std::time::Duration;

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

use super::{Backend, SESSION_EXPIRED};
use crate::{error::AppError, notify::Notice};

pub const NEW_TASK: &str = "New maintenance task has been scheduled!";

/// Last observed count of newly scheduled tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduledCountTracker {
    baseline: usize,
}

impl ScheduledCountTracker {
    pub fn new(baseline: usize) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> usize {
        self.baseline
    }

    /// Record `count`; true when it exceeds the previous baseline.
    ///
    /// The baseline follows the count in both directions, so decreases are
    /// absorbed without an alert.
    pub fn observe(&mut self, count: usize) -> bool {
        let increased = count > self.baseline;
        self.baseline = count;
        increased
    }
}

/// Emitted when more tasks are scheduled than at the previous tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTasks {
    pub previous: usize,
    pub current: usize,
}

#[derive(Clone)]
pub struct PollingNotifier {
    backend: Backend,
    interval: Duration,
}

impl PollingNotifier {
    pub fn new(backend: Backend, interval: Duration) -> Self {
        Self { backend, interval }
    }

    /// Initial count; a failed read counts as zero
    pub async fn baseline(&self) -> ScheduledCountTracker {
        match self.backend.api.new_scheduled().await {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "Scheduled task baseline");
                ScheduledCountTracker::new(tasks.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read scheduled task baseline");
                self.end_session_on(&e);
                ScheduledCountTracker::new(0)
            }
        }
    }

    /// One poll. Read failures are logged and leave the baseline unchanged;
    /// a 401/403 also ends the session.
    pub async fn tick(&self, tracker: &mut ScheduledCountTracker) -> Option<NewTasks> {
        let count = match self.backend.api.new_scheduled().await {
            Ok(tasks) => tasks.len(),
            Err(e) => {
                tracing::warn!(error = %e, "Polling for new scheduled tasks failed");
                self.end_session_on(&e);
                return None;
            }
        };

        let previous = tracker.baseline();
        if !tracker.observe(count) {
            return None;
        }

        tracing::info!(previous, current = count, "New maintenance tasks scheduled");
        self.backend.notify(Notice::info(NEW_TASK));
        Some(NewTasks {
            previous,
            current: count,
        })
    }

    fn end_session_on(&self, err: &AppError) {
        if err.is_session_failure() && self.backend.session.is_active() {
            self.backend.notify(Notice::error(SESSION_EXPIRED));
            self.backend.terminate_session(SESSION_EXPIRED);
        }
    }

    /// Start polling on a background task.
    ///
    /// The event channel closes when the task stops, so
    /// [`PollerHandle::next_event`] yields `None` after a rejected session.
    pub fn spawn(self) -> PollerHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut tracker = self.baseline().await;
            if !self.backend.session.is_active() {
                tracing::debug!("Scheduled task poller stopped: no session");
                return;
            }

            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        if let Some(event) = self.tick(&mut tracker).await {
                            if events_tx.send(event).is_err() {
                                break;
                            }
                        }
                        if !self.backend.session.is_active() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Scheduled task poller stopped");
        });

        PollerHandle {
            events: events_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running poller; dropping it stops the poller
pub struct PollerHandle {
    events: mpsc::UnboundedReceiver<NewTasks>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Wait for the next increase; `None` once the poller has stopped
    pub async fn next_event(&mut self) -> Option<NewTasks> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<NewTasks> {
        self.events.try_recv().ok()
    }

    /// Stop the poller and wait for its task to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        api::MockMaintenanceApi,
        error::AppError,
        models::ScheduledTask,
        notify::MemoryNotifier,
        session::Session,
    };

    fn tasks(n: usize) -> Vec<ScheduledTask> {
        (0..n)
            .map(|i| ScheduledTask {
                maintenance_id: format!("M{i}"),
                equipment_id: format!("EQ-{i}"),
                date: None,
                maintenance_type: None,
            })
            .collect()
    }

    fn poller(counts: Vec<Result<usize, AppError>>) -> (PollingNotifier, Arc<MemoryNotifier>) {
        let mut mock = MockMaintenanceApi::new();
        let mut seq = mockall::Sequence::new();
        for count in counts {
            let mut slot = Some(count);
            mock.expect_new_scheduled()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || match slot.take() {
                    Some(Ok(n)) => Ok(tasks(n)),
                    Some(Err(e)) => Err(e),
                    None => Ok(vec![]),
                });
        }
        let notifier = Arc::new(MemoryNotifier::new());
        let backend = Backend::new(Arc::new(mock), Session::with_token("t"), notifier.clone());
        (PollingNotifier::new(backend, Duration::from_secs(30)), notifier)
    }

    #[test]
    fn test_tracker_alerts_only_on_increase() {
        let mut tracker = ScheduledCountTracker::new(3);
        assert!(!tracker.observe(3));
        assert!(tracker.observe(5));
        assert_eq!(tracker.baseline(), 5);
        assert!(!tracker.observe(2));
        assert_eq!(tracker.baseline(), 2);
        assert!(tracker.observe(3));
    }

    #[tokio::test]
    async fn test_three_three_five() {
        let (poller, notifier) = poller(vec![Ok(3), Ok(3), Ok(5)]);

        let mut tracker = poller.baseline().await;
        assert_eq!(tracker.baseline(), 3);

        assert_eq!(poller.tick(&mut tracker).await, None);
        assert!(notifier.notices().is_empty());

        assert_eq!(
            poller.tick(&mut tracker).await,
            Some(NewTasks { previous: 3, current: 5 })
        );
        assert_eq!(notifier.messages(), vec![NEW_TASK.to_string()]);
        assert_eq!(tracker.baseline(), 5);
    }

    #[tokio::test]
    async fn test_failed_baseline_counts_as_zero() {
        let (poller, notifier) = poller(vec![Err(AppError::Network("down".into())), Ok(1)]);

        let mut tracker = poller.baseline().await;
        assert_eq!(tracker.baseline(), 0);
        assert!(poller.tick(&mut tracker).await.is_some());
        assert_eq!(notifier.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_tick_keeps_baseline() {
        let (poller, _) = poller(vec![Err(AppError::Server { status: 500, detail: None })]);
        let mut tracker = ScheduledCountTracker::new(4);
        assert_eq!(poller.tick(&mut tracker).await, None);
        assert_eq!(tracker.baseline(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_poller_reports_increase_and_stops() {
        let (poller, notifier) = poller(vec![Ok(3), Ok(3), Ok(5)]);
        let mut handle = poller.spawn();

        let event = handle.next_event().await;
        assert_eq!(event, Some(NewTasks { previous: 3, current: 5 }));
        assert_eq!(notifier.messages(), vec![NEW_TASK.to_string()]);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_rejected_tick_ends_session() {
        let (poller, notifier) = poller(vec![Err(AppError::Authorization("Not authenticated".into()))]);
        let mut tracker = ScheduledCountTracker::new(2);

        assert_eq!(poller.tick(&mut tracker).await, None);
        assert_eq!(tracker.baseline(), 2);
        assert!(!poller.backend.session.is_active());
        assert_eq!(notifier.terminations(), 1);
        assert_eq!(notifier.messages(), vec![SESSION_EXPIRED.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_poller_stops_when_session_is_rejected() {
        let (poller, notifier) = poller(vec![
            Ok(3),
            Err(AppError::Authentication("Invalid token".into())),
        ]);
        let session = poller.backend.session.clone();
        let mut handle = poller.spawn();

        assert_eq!(handle.next_event().await, None);
        assert!(!session.is_active());
        assert_eq!(notifier.terminations(), 1);

        handle.shutdown().await;
    }
}
