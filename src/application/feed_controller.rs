// Feed controller - paginated load state machine for one session
use crate::application::launch_gateway::{FetchError, LaunchPage};
use crate::domain::histogram::Histogram;
use crate::domain::launch::{Generation, LaunchRecord, RecordKey};
use crate::domain::selection::{Coordinate, SelectionSet};
use crate::domain::window::DateWindow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadKind {
    Initial,
    Continuation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "kind")]
pub enum FeedStatus {
    Idle,
    Loading(LoadKind),
    Loaded,
    Error,
}

/// Describes one issued fetch. Results are only applied while the
/// controller is still on the ticket's generation.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub kind: LoadKind,
    pub window: DateWindow,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Loaded { appended: usize },
    Failed,
    ContinuationFailed,
    Stale,
}

#[derive(Debug)]
pub struct FeedController {
    window: DateWindow,
    generation: Generation,
    status: FeedStatus,
    records: Vec<LaunchRecord>,
    total_count: usize,
    last_error: Option<String>,
    selection: SelectionSet,
    histogram: Histogram,
}

impl FeedController {
    pub fn new(window: DateWindow) -> Self {
        Self {
            window,
            generation: Generation::default(),
            status: FeedStatus::Idle,
            records: Vec::new(),
            total_count: 0,
            last_error: None,
            selection: SelectionSet::new(),
            histogram: Histogram::default(),
        }
    }

    /// Issues the initial load for the current window (mount or retry).
    /// Only valid while idle or after a failed initial load.
    pub fn begin_initial(&mut self) -> Option<FetchTicket> {
        match self.status {
            FeedStatus::Idle | FeedStatus::Error => Some(self.restart()),
            _ => None,
        }
    }

    /// Discards everything loaded for the previous window and starts over.
    pub fn change_window(&mut self, window: DateWindow) -> FetchTicket {
        self.window = window;
        self.selection.clear();
        self.selection_changed();
        self.restart()
    }

    /// Issues the next page when the feed is loaded but incomplete.
    pub fn begin_continuation(&mut self) -> Option<FetchTicket> {
        if !self.can_load_more() {
            return None;
        }
        self.status = FeedStatus::Loading(LoadKind::Continuation);
        Some(self.ticket(LoadKind::Continuation))
    }

    pub fn apply(
        &mut self,
        ticket: &FetchTicket,
        result: Result<LaunchPage, FetchError>,
    ) -> ApplyOutcome {
        if ticket.generation != self.generation || self.status != FeedStatus::Loading(ticket.kind) {
            tracing::debug!(
                "Dropping stale {:?} result for generation {} (current {})",
                ticket.kind,
                ticket.generation,
                self.generation
            );
            return ApplyOutcome::Stale;
        }

        match (ticket.kind, result) {
            (LoadKind::Initial, Ok(page)) => {
                let mut records = self.ingest(page.records);
                if records.len() > page.total_count {
                    tracing::warn!(
                        "Initial page for {} holds {} launches but reports {}; truncating",
                        self.window,
                        records.len(),
                        page.total_count
                    );
                    records.truncate(page.total_count);
                }
                self.records = records;
                self.total_count = page.total_count;
                self.status = FeedStatus::Loaded;
                ApplyOutcome::Loaded {
                    appended: self.records.len(),
                }
            }
            (LoadKind::Initial, Err(e)) => {
                tracing::warn!("Initial load for {} failed: {}", self.window, e);
                self.last_error = Some(e.to_string());
                self.status = FeedStatus::Error;
                ApplyOutcome::Failed
            }
            (LoadKind::Continuation, Ok(page)) => {
                let remaining = self.total_count - self.records.len();
                if page.records.is_empty() {
                    // Source ran dry before reaching its reported total
                    self.total_count = self.records.len();
                }
                let mut fresh = self.ingest(page.records);
                fresh.truncate(remaining);
                let appended = fresh.len();
                self.records.extend(fresh);
                self.status = FeedStatus::Loaded;
                ApplyOutcome::Loaded { appended }
            }
            (LoadKind::Continuation, Err(e)) => {
                tracing::warn!(
                    "Continuation at offset {} for {} failed: {}",
                    ticket.offset,
                    self.window,
                    e
                );
                self.status = FeedStatus::Loaded;
                ApplyOutcome::ContinuationFailed
            }
        }
    }

    /// Saves or unsaves a launch. Returns whether it is saved afterwards.
    pub fn toggle(&mut self, record: &LaunchRecord) -> bool {
        let saved = self.selection.toggle(record);
        self.selection_changed();
        saved
    }

    /// Toggles by key, looking in the loaded records first and then in the
    /// selection. `None` when the key is unknown to both.
    pub fn toggle_key(&mut self, key: &RecordKey) -> Option<bool> {
        let record = self
            .records
            .iter()
            .find(|record| record.origin() == key.origin && record.id() == key.id)
            .or_else(|| self.selection.get(key))
            .cloned()?;
        Some(self.toggle(&record))
    }

    pub fn is_saved(&self, key: &RecordKey) -> bool {
        self.selection.contains(key)
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn loaded_count(&self) -> usize {
        self.records.len()
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, FeedStatus::Loading(_))
    }

    pub fn has_error(&self) -> bool {
        self.status == FeedStatus::Error
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn can_load_more(&self) -> bool {
        self.status == FeedStatus::Loaded && self.records.len() < self.total_count
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.selection.coordinates()
    }

    fn restart(&mut self) -> FetchTicket {
        self.generation = self.generation.next();
        self.records.clear();
        self.total_count = 0;
        self.last_error = None;
        self.status = FeedStatus::Loading(LoadKind::Initial);
        tracing::info!("Loading launches for {} (generation {})", self.window, self.generation);
        self.ticket(LoadKind::Initial)
    }

    fn ticket(&self, kind: LoadKind) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            kind,
            window: self.window,
            offset: match kind {
                LoadKind::Initial => 0,
                LoadKind::Continuation => self.records.len(),
            },
        }
    }

    fn ingest(&self, records: Vec<LaunchRecord>) -> Vec<LaunchRecord> {
        records
            .into_iter()
            .map(|record| record.ingested(self.generation))
            .collect()
    }

    fn selection_changed(&mut self) {
        self.histogram = Histogram::aggregate(&self.selection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::launch_gateway::{FormatError, TransportError};
    use crate::domain::launch::sample_record;

    fn january() -> DateWindow {
        DateWindow::parse("2024-01-01", "2024-01-31").unwrap()
    }

    fn february() -> DateWindow {
        DateWindow::parse("2024-02-01", "2024-02-29").unwrap()
    }

    fn page(ids: &[(&str, &str)], total_count: usize) -> Result<LaunchPage, FetchError> {
        Ok(LaunchPage {
            records: ids.iter().map(|(id, loc)| sample_record(id, loc)).collect(),
            total_count,
        })
    }

    fn transport_failure() -> Result<LaunchPage, FetchError> {
        Err(TransportError::Status {
            status: 503,
            body: "unavailable".to_string(),
        }
        .into())
    }

    fn loaded(ids: &[(&str, &str)], total: usize) -> FeedController {
        let mut controller = FeedController::new(january());
        let ticket = controller.begin_initial().unwrap();
        controller.apply(&ticket, page(ids, total));
        controller
    }

    #[test]
    fn test_initial_load() {
        let mut controller = FeedController::new(january());
        assert_eq!(controller.status(), FeedStatus::Idle);

        let ticket = controller.begin_initial().unwrap();
        assert!(controller.is_loading());
        assert_eq!(ticket.offset, 0);
        assert_eq!(ticket.kind, LoadKind::Initial);

        let outcome = controller.apply(&ticket, page(&[("1", "X, USA"), ("2", "Y, France")], 2));
        assert_eq!(outcome, ApplyOutcome::Loaded { appended: 2 });
        assert_eq!(controller.status(), FeedStatus::Loaded);
        assert_eq!(controller.loaded_count(), 2);
        assert_eq!(controller.total_count(), 2);
        assert!(controller.records().iter().all(|r| r.origin() == ticket.generation));
    }

    #[test]
    fn test_begin_initial_only_from_idle_or_error() {
        let mut controller = FeedController::new(january());
        controller.begin_initial().unwrap();
        assert!(controller.begin_initial().is_none());
    }

    #[test]
    fn test_initial_failure_sets_error_and_retry_reloads() {
        let mut controller = FeedController::new(january());
        let ticket = controller.begin_initial().unwrap();
        assert_eq!(controller.apply(&ticket, transport_failure()), ApplyOutcome::Failed);
        assert!(controller.has_error());
        assert!(!controller.is_loading());
        assert!(controller.last_error().unwrap().contains("503"));

        let retry = controller.begin_initial().unwrap();
        assert_eq!(retry.kind, LoadKind::Initial);
        assert_eq!(retry.window, january());
        assert!(!controller.has_error());
        assert!(controller.last_error().is_none());

        controller.apply(&retry, page(&[("1", "X, USA")], 1));
        assert_eq!(controller.status(), FeedStatus::Loaded);
    }

    #[test]
    fn test_format_failure_also_sets_error() {
        let mut controller = FeedController::new(january());
        let ticket = controller.begin_initial().unwrap();
        let failure = Err(FormatError::MissingField {
            location: "results[0]".to_string(),
            field: "name".to_string(),
        }
        .into());
        controller.apply(&ticket, failure);
        assert!(controller.has_error());
    }

    #[test]
    fn test_continuation_appends_in_order() {
        let mut controller = loaded(&[("1", "X, USA"), ("2", "Y, France")], 4);
        assert!(controller.can_load_more());

        let ticket = controller.begin_continuation().unwrap();
        assert_eq!(ticket.offset, 2);
        assert!(controller.is_loading());
        assert!(controller.begin_continuation().is_none());

        let outcome = controller.apply(&ticket, page(&[("3", "Z, Japan"), ("4", "W, China")], 4));
        assert_eq!(outcome, ApplyOutcome::Loaded { appended: 2 });
        let ids: Vec<&str> = controller.records().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert!(!controller.can_load_more());
    }

    #[test]
    fn test_continuation_noop_when_complete() {
        let mut controller = loaded(&[("1", "X, USA")], 1);
        for _ in 0..3 {
            assert!(controller.begin_continuation().is_none());
        }
        assert_eq!(controller.status(), FeedStatus::Loaded);
        assert_eq!(controller.loaded_count(), 1);
    }

    #[test]
    fn test_continuation_failure_keeps_loaded() {
        let mut controller = loaded(&[("1", "X, USA")], 3);
        let ticket = controller.begin_continuation().unwrap();
        assert_eq!(
            controller.apply(&ticket, transport_failure()),
            ApplyOutcome::ContinuationFailed
        );
        assert_eq!(controller.status(), FeedStatus::Loaded);
        assert!(!controller.has_error());
        assert_eq!(controller.loaded_count(), 1);
        assert!(controller.begin_continuation().is_some());
    }

    #[test]
    fn test_continuation_overrun_is_truncated() {
        let mut controller = loaded(&[("1", "X, USA")], 2);
        let ticket = controller.begin_continuation().unwrap();
        controller.apply(&ticket, page(&[("2", "Y, USA"), ("3", "Z, USA")], 2));
        assert_eq!(controller.loaded_count(), 2);
        assert!(controller.loaded_count() <= controller.total_count());
    }

    #[test]
    fn test_initial_overrun_is_truncated() {
        let mut controller = FeedController::new(january());
        let ticket = controller.begin_initial().unwrap();
        let outcome = controller.apply(&ticket, page(&[("1", "X, USA"), ("2", "Y, France")], 1));
        assert_eq!(outcome, ApplyOutcome::Loaded { appended: 1 });
        assert_eq!(controller.loaded_count(), 1);
        assert_eq!(controller.total_count(), 1);
        assert_eq!(controller.records()[0].id(), "1");
        assert!(!controller.can_load_more());
    }

    #[test]
    fn test_empty_continuation_completes_feed() {
        let mut controller = loaded(&[("1", "X, USA")], 5);
        let ticket = controller.begin_continuation().unwrap();
        controller.apply(&ticket, page(&[], 5));
        assert_eq!(controller.total_count(), 1);
        assert!(!controller.can_load_more());
    }

    #[test]
    fn test_window_change_resets_everything() {
        let mut controller = loaded(&[("1", "X, USA"), ("2", "Y, France")], 5);
        let first = controller.records()[0].clone();
        controller.toggle(&first);
        assert_eq!(controller.selection().len(), 1);

        let ticket = controller.change_window(february());
        assert_eq!(controller.window(), february());
        assert!(controller.records().is_empty());
        assert_eq!(controller.total_count(), 0);
        assert!(controller.selection().is_empty());
        assert!(controller.histogram().is_empty());
        assert!(controller.is_loading());
        assert_eq!(ticket.window, february());
    }

    #[test]
    fn test_window_change_while_in_error() {
        let mut controller = FeedController::new(january());
        let ticket = controller.begin_initial().unwrap();
        controller.apply(&ticket, transport_failure());
        controller.change_window(february());
        assert!(!controller.has_error());
        assert!(controller.is_loading());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut controller = FeedController::new(january());
        let old = controller.begin_initial().unwrap();
        let new = controller.change_window(february());

        let outcome = controller.apply(&old, page(&[("jan", "X, USA")], 1));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(controller.records().is_empty());
        assert!(controller.is_loading());

        controller.apply(&new, page(&[("feb", "Y, France")], 1));
        assert_eq!(controller.records()[0].id(), "feb");
    }

    #[test]
    fn test_stale_continuation_is_discarded() {
        let mut controller = loaded(&[("1", "X, USA")], 3);
        let continuation = controller.begin_continuation().unwrap();
        let fresh = controller.change_window(february());
        controller.apply(&fresh, page(&[("a", "Y, France")], 1));

        let outcome = controller.apply(&continuation, page(&[("2", "X, USA")], 3));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(controller.loaded_count(), 1);
        assert_eq!(controller.records()[0].id(), "a");
    }

    #[test]
    fn test_scenario_two_countries() {
        let mut controller = loaded(&[("1", "Cape Canaveral, FL, USA"), ("2", "Kourou, France")], 2);
        let records = controller.records().to_vec();
        for record in &records {
            assert!(controller.toggle(record));
        }

        let countries: Vec<&str> = controller.selection().iter().map(|r| r.country()).collect();
        assert_eq!(countries, vec!["France", "USA"]);
        assert_eq!(controller.histogram().categories, vec!["France", "USA"]);
        assert_eq!(controller.histogram().counts, vec![1, 1]);
        assert_eq!(controller.coordinates().len(), 2);
    }

    #[test]
    fn test_toggle_key() {
        let mut controller = loaded(&[("1", "X, USA")], 1);
        let key = controller.records()[0].key();
        assert_eq!(controller.toggle_key(&key), Some(true));
        assert!(controller.is_saved(&key));
        assert_eq!(controller.histogram().total(), 1);
        assert_eq!(controller.toggle_key(&key), Some(false));
        assert_eq!(controller.histogram().total(), 0);

        let unknown = RecordKey::new(controller.generation(), "missing");
        assert_eq!(controller.toggle_key(&unknown), None);
    }
}
