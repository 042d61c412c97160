//! List projection engine.
//!
//! Combines the raw catalog, the search criteria and the pagination window
//! into the page of products to render.
//!
//! ```text
//! repository ──reload()──▶ records ──filter(criteria)──▶ filtered ──page(window)──▶ displayed
//! ```
//!
//! Criteria changes and successful reloads re-run the whole pipeline and send
//! the user back to the first page. Pagination changes only re-slice
//! `filtered`. Both paths read the latest snapshot of each store, so running
//! them redundantly or in any order converges to the same projection.
//!
//! Every pipeline run happens inside the state channel's write lock, checks
//! included. Lock order is state first, then the filter and pagination
//! stores; nothing in here may borrow the state channel from inside it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, instrument, warn};

use crate::error::LOAD_ERROR_MESSAGE;
use crate::filter::{apply_filters, FilterStore};
use crate::models::{FilterStats, FinancialProduct, PaginationPatch, SearchCriteria};
use crate::pagination::{page_items, results_label, PaginationStore};
use crate::repository::FinancialProductRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Everything the engine owns, published on every change
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionState {
    pub status: LoadStatus,
    /// Last successfully loaded catalog
    pub records: Arc<Vec<FinancialProduct>>,
    pub filtered: Vec<FinancialProduct>,
    /// Contiguous slice of `filtered` for the current page
    pub displayed: Vec<FinancialProduct>,
    /// User-facing message of the last failed load; empty otherwise
    pub error_message: String,
    applied_criteria: Option<SearchCriteria>,
}

/// What the view renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionResult {
    pub filtered: Vec<FinancialProduct>,
    pub displayed: Vec<FinancialProduct>,
    pub is_loading: bool,
    pub error_message: String,
}

impl From<&ProjectionState> for ProjectionResult {
    fn from(state: &ProjectionState) -> Self {
        Self {
            filtered: state.filtered.clone(),
            displayed: state.displayed.clone(),
            is_loading: state.status == LoadStatus::Loading,
            error_message: state.error_message.clone(),
        }
    }
}

/// How a single `reload()` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Loaded { count: usize },
    Failed,
    /// A newer reload started (or the binding was torn down) before this one
    /// completed; its response was discarded
    Superseded,
}

pub struct ListProjectionEngine<R: FinancialProductRepository> {
    repository: Arc<R>,
    filters: FilterStore,
    pagination: PaginationStore,
    state: Arc<watch::Sender<ProjectionState>>,
    generation: Arc<AtomicU64>,
}

impl<R: FinancialProductRepository> ListProjectionEngine<R> {
    pub fn new(repository: R, filters: FilterStore, pagination: PaginationStore) -> Self {
        Self::with_shared_repository(Arc::new(repository), filters, pagination)
    }

    pub fn with_shared_repository(
        repository: Arc<R>,
        filters: FilterStore,
        pagination: PaginationStore,
    ) -> Self {
        let (state, _) = watch::channel(ProjectionState::default());
        Self {
            repository,
            filters,
            pagination,
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn repository(&self) -> Arc<R> {
        Arc::clone(&self.repository)
    }

    pub fn filters(&self) -> &FilterStore {
        &self.filters
    }

    pub fn pagination(&self) -> &PaginationStore {
        &self.pagination
    }

    /// Fetch the catalog and re-project it.
    ///
    /// Only the most recently started reload may apply its response; older
    /// ones resolve as [`ReloadOutcome::Superseded`]. A failure keeps the
    /// previously loaded records.
    #[instrument(skip(self))]
    pub async fn reload(&self) -> ReloadOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.status = LoadStatus::Loading;
            state.error_message.clear();
        });

        let result = self.repository.list().await;

        let mut outcome = ReloadOutcome::Superseded;
        self.state.send_if_modified(|state| {
            // Checked under the lock so a newer reload cannot interleave
            if !self.is_current(generation) {
                return false;
            }
            match result {
                Ok(records) => {
                    outcome = ReloadOutcome::Loaded { count: records.len() };
                    state.records = Arc::new(records);
                    state.status = LoadStatus::Ready;
                    state.error_message.clear();
                    self.project(state, self.filters.current());
                }
                Err(err) => {
                    error!(error = %err, "Error loading financial products");
                    outcome = ReloadOutcome::Failed;
                    state.status = LoadStatus::Failed;
                    state.error_message = LOAD_ERROR_MESSAGE.to_string();
                }
            }
            true
        });

        match outcome {
            ReloadOutcome::Loaded { count } => info!(count, "Financial products loaded"),
            ReloadOutcome::Superseded => debug!(generation, "Discarding stale catalog response"),
            ReloadOutcome::Failed => {}
        }
        outcome
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Re-filter with the current criteria, go back to page 1 and re-slice
    pub fn recompute(&self) {
        self.state
            .send_modify(|state| self.project(state, self.filters.current()));
    }

    /// Re-slice `filtered` for the current pagination window
    pub fn refresh_page(&self) {
        self.state.send_if_modified(|state| {
            let window = self.pagination.current();
            let displayed = page_items(&state.filtered, window.current_page, window.items_per_page);
            if displayed == state.displayed {
                return false;
            }
            state.displayed = displayed;
            true
        });
    }

    /// Recompute only if the criteria differ from the last applied ones
    fn sync_criteria(&self) {
        self.state.send_if_modified(|state| {
            let criteria = self.filters.current();
            if state.applied_criteria.as_ref() == Some(&criteria) {
                return false;
            }
            self.project(state, criteria);
            true
        });
    }

    /// Run the pipeline over `state.records`. Caller holds the state lock.
    fn project(&self, state: &mut ProjectionState, criteria: SearchCriteria) {
        let filtered = apply_filters(&state.records, &criteria);
        self.pagination
            .update(PaginationPatch::page(1).with_total_items(filtered.len()));

        let window = self.pagination.current();
        let displayed = page_items(&filtered, window.current_page, window.items_per_page);

        debug!(
            search_term = %criteria.search_term,
            filtered = filtered.len(),
            displayed = displayed.len(),
            "Projection recomputed"
        );

        state.filtered = filtered;
        state.displayed = displayed;
        state.applied_criteria = Some(criteria);
    }

    pub fn search(&self, term: impl Into<String>) {
        self.filters.update_search_term(term);
        self.recompute();
    }

    pub fn clear_filters(&self) {
        self.filters.clear();
        self.recompute();
    }

    pub fn next_page(&self) {
        self.pagination.next_page();
        self.refresh_page();
    }

    pub fn previous_page(&self) {
        self.pagination.previous_page();
        self.refresh_page();
    }

    pub fn set_items_per_page(&self, items_per_page: usize) {
        self.pagination.set_items_per_page(items_per_page);
        self.refresh_page();
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages()
    }

    /// Counter label for the rows currently shown
    pub fn results_text(&self) -> String {
        results_label(self.state.borrow().displayed.len())
    }

    pub fn filter_stats(&self) -> FilterStats {
        let state = self.state.borrow();
        self.filters
            .filter_stats(state.records.len(), state.filtered.len())
    }

    pub fn snapshot(&self) -> ProjectionResult {
        ProjectionResult::from(&*self.state.borrow())
    }

    pub fn state(&self) -> ProjectionState {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.state.borrow().status
    }

    pub fn raw_records(&self) -> Arc<Vec<FinancialProduct>> {
        Arc::clone(&self.state.borrow().records)
    }

    /// Live projection; the receiver starts at the current state
    pub fn subscribe(&self) -> watch::Receiver<ProjectionState> {
        self.state.subscribe()
    }
}

impl<R: FinancialProductRepository + 'static> ListProjectionEngine<R> {
    /// Follow filter and pagination changes in a background task.
    ///
    /// Must be called from within a tokio runtime. The subscription lives
    /// until the returned binding is released or dropped.
    pub fn bind(&self) -> ProjectionBinding {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let mut criteria = self.filters.changes();
        let mut windows = self.pagination.changes();
        let engine = self.clone();

        let handle = tokio::spawn(async move {
            debug!("Projection bound to filter and pagination changes");
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => break,
                    Some(_) = criteria.next() => engine.sync_criteria(),
                    Some(_) = windows.next() => engine.refresh_page(),
                    else => break,
                }
            }
            debug!("Projection binding released");
        });

        ProjectionBinding {
            shutdown,
            generation: Arc::clone(&self.generation),
            handle: Some(handle),
        }
    }
}

impl<R: FinancialProductRepository> Clone for ListProjectionEngine<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            filters: self.filters.clone(),
            pagination: self.pagination.clone(),
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
        }
    }
}

/// Subscription of an engine to its stores.
///
/// Dropping it stops the background task before it handles another change and
/// discards any reload still in flight.
pub struct ProjectionBinding {
    shutdown: watch::Sender<bool>,
    generation: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ProjectionBinding {
    /// Tear down and wait for the background task to finish
    pub async fn release(mut self) {
        self.signal();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Projection task ended abnormally");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        !*self.shutdown.borrow()
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    fn signal(&self) {
        if !self.shutdown.send_replace(true) {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for ProjectionBinding {
    fn drop(&mut self) {
        self.signal();
    }
}
