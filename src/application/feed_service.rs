// Feed service - Use cases driving the controller against the gateway
use crate::application::feed_controller::{ApplyOutcome, FeedController, FeedStatus, FetchTicket};
use crate::application::launch_gateway::LaunchGateway;
use crate::domain::histogram::Histogram;
use crate::domain::launch::{LaunchRecord, RecordKey};
use crate::domain::selection::{Coordinate, SelectionSet};
use crate::domain::window::{DateWindow, WindowError};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Read-only copy of everything the renderers consume.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub window: DateWindow,
    pub status: FeedStatus,
    pub is_loading: bool,
    pub has_error: bool,
    pub error: Option<String>,
    pub records: Vec<LaunchRecord>,
    pub loaded_count: usize,
    pub total_count: usize,
    pub can_load_more: bool,
    pub selection: SelectionSet,
    pub histogram: Histogram,
    pub coordinates: Vec<Coordinate>,
}

impl FeedSnapshot {
    pub fn of(controller: &FeedController) -> Self {
        Self {
            window: controller.window(),
            status: controller.status(),
            is_loading: controller.is_loading(),
            has_error: controller.has_error(),
            error: controller.last_error().map(str::to_string),
            records: controller.records().to_vec(),
            loaded_count: controller.loaded_count(),
            total_count: controller.total_count(),
            can_load_more: controller.can_load_more(),
            selection: controller.selection().clone(),
            histogram: controller.histogram().clone(),
            coordinates: controller.coordinates(),
        }
    }
}

#[derive(Clone)]
pub struct FeedService {
    gateway: Arc<dyn LaunchGateway>,
    controller: Arc<Mutex<FeedController>>,
    snapshots: Arc<watch::Sender<FeedSnapshot>>,
}

impl FeedService {
    pub fn new(gateway: Arc<dyn LaunchGateway>, window: DateWindow) -> Self {
        let controller = FeedController::new(window);
        let (snapshots, _) = watch::channel(FeedSnapshot::of(&controller));
        Self {
            gateway,
            controller: Arc::new(Mutex::new(controller)),
            snapshots: Arc::new(snapshots),
        }
    }

    /// First load for the session's window. No-op unless idle.
    pub async fn mount(&self) -> Option<ApplyOutcome> {
        let ticket = self.issue(|controller| controller.begin_initial()).await?;
        Some(self.run(ticket).await)
    }

    /// Re-issues the initial load after a failure. No-op unless idle or in error.
    pub async fn retry(&self) -> Option<ApplyOutcome> {
        self.mount().await
    }

    pub async fn change_window(&self, start: &str, end: &str) -> Result<ApplyOutcome, WindowError> {
        let ticket = self.begin_window_change(start, end).await?;
        Ok(self.run(ticket).await)
    }

    /// Resets state for the new window and returns the ticket without
    /// fetching, so callers can run the load in the background.
    pub async fn begin_window_change(&self, start: &str, end: &str) -> Result<FetchTicket, WindowError> {
        let window = DateWindow::parse(start, end)?;
        tracing::info!("Date window changed to {}", window);
        let ticket = {
            let mut controller = self.controller.lock().await;
            let ticket = controller.change_window(window);
            self.publish(&controller);
            ticket
        };
        Ok(ticket)
    }

    pub async fn begin_retry(&self) -> Option<FetchTicket> {
        self.issue(|controller| controller.begin_initial()).await
    }

    pub async fn begin_load_more(&self) -> Option<FetchTicket> {
        self.issue(|controller| controller.begin_continuation()).await
    }

    /// Fetches the next page if the feed is loaded and incomplete.
    pub async fn load_more(&self) -> Option<ApplyOutcome> {
        let ticket = self.begin_load_more().await?;
        Some(self.run(ticket).await)
    }

    /// Runs an issued ticket against the gateway and applies the result.
    /// The controller lock is not held while the request is in flight.
    pub async fn run(&self, ticket: FetchTicket) -> ApplyOutcome {
        tracing::debug!(
            "Fetching {:?} page for {} at offset {}",
            ticket.kind,
            ticket.window,
            ticket.offset
        );
        let result = self.gateway.fetch_page(&ticket.window, ticket.offset).await;

        let mut controller = self.controller.lock().await;
        let outcome = controller.apply(&ticket, result);
        if outcome != ApplyOutcome::Stale {
            self.publish(&controller);
        }
        outcome
    }

    pub async fn toggle(&self, key: &RecordKey) -> Option<bool> {
        let mut controller = self.controller.lock().await;
        let saved = controller.toggle_key(key)?;
        self.publish(&controller);
        Some(saved)
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.subscribe()
    }

    async fn issue<F>(&self, begin: F) -> Option<FetchTicket>
    where
        F: FnOnce(&mut FeedController) -> Option<FetchTicket>,
    {
        let mut controller = self.controller.lock().await;
        let ticket = begin(&mut *controller)?;
        self.publish(&controller);
        Some(ticket)
    }

    fn publish(&self, controller: &FeedController) {
        self.snapshots.send_replace(FeedSnapshot::of(controller));
    }
}
