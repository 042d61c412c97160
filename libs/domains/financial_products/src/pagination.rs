//! Pagination window store.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{trace, warn};

use crate::models::{PaginationPatch, PaginationWindow};

/// Holds the current pagination window and publishes every change.
///
/// The store never clamps `current_page` on its own; keeping the page inside
/// the available range is the projection engine's job.
#[derive(Clone)]
pub struct PaginationStore {
    window: Arc<watch::Sender<PaginationWindow>>,
}

impl PaginationStore {
    pub fn new() -> Self {
        Self::with_window(PaginationWindow::default())
    }

    pub fn with_window(window: PaginationWindow) -> Self {
        let (window, _) = watch::channel(window);
        Self {
            window: Arc::new(window),
        }
    }

    /// Merge `patch` into the current window and emit
    pub fn update(&self, patch: PaginationPatch) {
        self.window.send_modify(|window| {
            *window = patch.apply_to(window);
            trace!(?window, "Pagination updated");
        });
    }

    pub fn current(&self) -> PaginationWindow {
        *self.window.borrow()
    }

    /// Stream of window snapshots, starting with the current one
    pub fn changes(&self) -> WatchStream<PaginationWindow> {
        WatchStream::new(self.window.subscribe())
    }

    /// Advance one page if there is one; otherwise leave the window untouched
    pub fn next_page(&self) {
        self.window.send_if_modified(|window| {
            if window.current_page < total_pages(window.total_items, window.items_per_page) {
                window.current_page += 1;
                true
            } else {
                false
            }
        });
    }

    /// Go back one page unless already on the first
    pub fn previous_page(&self) {
        self.window.send_if_modified(|window| {
            if window.current_page > 1 {
                window.current_page -= 1;
                true
            } else {
                false
            }
        });
    }

    /// Change the page size; always returns to the first page
    pub fn set_items_per_page(&self, items_per_page: usize) {
        if items_per_page == 0 {
            warn!("Ignoring zero page size, using 1");
        }
        self.update(
            PaginationPatch::page(1).with_items_per_page(items_per_page.max(1)),
        );
    }

    /// Restore the defaults: page 1, 5 per page, no items
    pub fn reset(&self) {
        self.window.send_replace(PaginationWindow::default());
    }

    pub fn total_pages(&self) -> usize {
        let window = self.current();
        total_pages(window.total_items, window.items_per_page)
    }

    pub fn has_next_page(&self) -> bool {
        let window = self.current();
        window.current_page < total_pages(window.total_items, window.items_per_page)
    }

    pub fn has_previous_page(&self) -> bool {
        self.current().current_page > 1
    }
}

impl Default for PaginationStore {
    fn default() -> Self {
        Self::new()
    }
}

/// `ceil(total_items / items_per_page)`; zero when either is zero
pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        return 0;
    }
    total_items.div_ceil(items_per_page)
}

/// Items of the 1-based `page`; empty when the page is out of range
pub fn page_items<T: Clone>(items: &[T], page: usize, items_per_page: usize) -> Vec<T> {
    if page == 0 {
        return Vec::new();
    }
    let start = (page - 1).saturating_mul(items_per_page);
    if start >= items.len() {
        return Vec::new();
    }
    let end = start.saturating_add(items_per_page).min(items.len());
    items[start..end].to_vec()
}

/// Result counter label, e.g. "1 Resultado" or "3 Resultados"
pub fn results_label(count: usize) -> String {
    match count {
        1 => "1 Resultado".to_string(),
        n => format!("{} Resultados", n),
    }
}
