//! Run-level cancellation and trigger-group supersession

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::pipeline::trigger::EventKind;

/// Handle for cancelling an in-flight run
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Creates a fresh handle and its receiver half
    #[must_use]
    pub fn new() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Cancels the run; idempotent
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Returns true once the run was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Tracks in-flight runs per logical trigger group and applies the
/// supersession rule: a newer run cancels its predecessor only when the
/// predecessor was review-triggered. Manual dispatch runs are never
/// auto-cancelled.
#[derive(Debug, Clone, Default)]
pub struct RunCoordinator {
    in_flight: Arc<DashMap<String, (EventKind, CancelHandle)>>,
}

impl RunCoordinator {
    /// Creates an empty coordinator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new run for a trigger group, superseding any in-flight
    /// predecessor per the cancellation rule.
    pub fn register(&self, group: impl Into<String>, event: EventKind, handle: CancelHandle) {
        let group = group.into();
        if let Some((previous_event, previous)) =
            self.in_flight.insert(group.clone(), (event, handle))
        {
            if previous_event == EventKind::PullRequest {
                info!(group = %group, "superseding in-flight review run");
                previous.cancel();
            }
        }
    }

    /// Removes a finished run from the group table
    pub fn finish(&self, group: &str) {
        self.in_flight.remove(group);
    }

    /// Returns the number of tracked in-flight runs
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_handle() {
        let (handle, rx) = CancelHandle::new();
        assert!(!handle.is_cancelled());
        assert!(!*rx.borrow());

        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(*rx.borrow());
    }

    #[test]
    fn test_pr_run_is_superseded() {
        let coordinator = RunCoordinator::new();
        let (first, _rx1) = CancelHandle::new();
        let (second, _rx2) = CancelHandle::new();

        coordinator.register("pr-42", EventKind::PullRequest, first.clone());
        coordinator.register("pr-42", EventKind::PullRequest, second.clone());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_dispatch_run_is_not_superseded() {
        let coordinator = RunCoordinator::new();
        let (first, _rx1) = CancelHandle::new();
        let (second, _rx2) = CancelHandle::new();

        coordinator.register("release", EventKind::ManualDispatch, first.clone());
        coordinator.register("release", EventKind::ManualDispatch, second.clone());

        assert!(!first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn test_finish_clears_group() {
        let coordinator = RunCoordinator::new();
        let (handle, _rx) = CancelHandle::new();
        coordinator.register("pr-7", EventKind::PullRequest, handle);
        assert_eq!(coordinator.in_flight(), 1);
        coordinator.finish("pr-7");
        assert_eq!(coordinator.in_flight(), 0);
    }
}
