use std::{fmt::Display, sync::Arc};

use chrono::NaiveDate;
use shared::protocol::{Page, PrescriptionSummary};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, error, info};

use crate::{
    backend::PrescriptionBackend,
    query::{on_state_change, FetchRequest, ListIntent, QueryState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer request was issued (or the view was torn down) meanwhile.
    Stale,
}

/// Query state plus the data last fetched for it.
///
/// Every fetch carries the generation current when it was issued;
/// [`ListController::complete`] ignores anything older than the latest
/// generation, so late responses never overwrite newer state.
#[derive(Debug, Clone)]
pub struct ListController {
    query: QueryState,
    generation: u64,
    rows: Vec<PrescriptionSummary>,
    total_pages: u32,
    loading: bool,
    empty: bool,
    last_error: Option<String>,
}

impl ListController {
    pub fn new(today: NaiveDate, page_size: u32) -> Self {
        Self {
            query: QueryState::defaults_for(today, page_size),
            generation: 0,
            rows: Vec::new(),
            total_pages: 0,
            loading: false,
            empty: false,
            last_error: None,
        }
    }

    /// Resets the filter to the defaults for `today` and always issues a fetch.
    pub fn mount(&mut self, today: NaiveDate) -> FetchRequest {
        self.query = QueryState::defaults_for(today, self.query.page_size);
        self.issue()
    }

    pub fn dispatch(&mut self, intent: ListIntent) -> Option<FetchRequest> {
        let next = self.query.apply(&intent, self.total_pages);
        if intent == ListIntent::Refresh {
            self.query = next;
            return Some(self.issue());
        }

        let request = on_state_change(&self.query, &next, self.generation + 1)?;
        self.query = next;
        Some(self.track(request))
    }

    fn issue(&mut self) -> FetchRequest {
        let request = FetchRequest {
            generation: self.generation + 1,
            query: self.query.to_query(),
        };
        self.track(request)
    }

    fn track(&mut self, request: FetchRequest) -> FetchRequest {
        self.generation = request.generation;
        self.loading = true;
        debug!(
            generation = request.generation,
            page = request.query.page,
            "list: fetch issued"
        );
        request
    }

    pub fn complete<E: Display>(
        &mut self,
        generation: u64,
        result: Result<Page<PrescriptionSummary>, E>,
    ) -> Completion {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "list: discarding stale response"
            );
            return Completion::Stale;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                info!(
                    generation,
                    rows = page.content.len(),
                    total_pages = page.total_pages,
                    "list: page applied"
                );
                self.empty = page.content.is_empty();
                self.rows = page.content;
                self.total_pages = page.total_pages;
                self.last_error = None;
            }
            Err(err) => {
                error!(generation, "list: fetch failed: {err}");
                self.last_error = Some(err.to_string());
            }
        }
        Completion::Applied
    }

    /// Invalidates any outstanding request; its response will be discarded.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rows(&self) -> &[PrescriptionSummary] {
        &self.rows
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Runs a [`ListController`] against a backend on the tokio runtime.
///
/// Issuing a new fetch aborts the previous one, and dropping the driver
/// aborts whatever is still in flight.
pub struct ListDriver {
    backend: Arc<dyn PrescriptionBackend>,
    controller: Arc<Mutex<ListController>>,
    in_flight: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ListDriver {
    pub fn new(backend: Arc<dyn PrescriptionBackend>, today: NaiveDate, page_size: u32) -> Self {
        Self {
            backend,
            controller: Arc::new(Mutex::new(ListController::new(today, page_size))),
            in_flight: std::sync::Mutex::new(None),
        }
    }

    pub async fn mount(&self, today: NaiveDate) {
        let request = self.controller.lock().await.mount(today);
        self.spawn_fetch(request);
    }

    /// Returns whether the intent produced a fetch.
    pub async fn dispatch(&self, intent: ListIntent) -> bool {
        let request = self.controller.lock().await.dispatch(intent);
        match request {
            Some(request) => {
                self.spawn_fetch(request);
                true
            }
            None => false,
        }
    }

    fn spawn_fetch(&self, request: FetchRequest) {
        let backend = Arc::clone(&self.backend);
        let controller = Arc::clone(&self.controller);
        let handle = tokio::spawn(async move {
            let result = backend.list_prescriptions(&request.query).await;
            controller.lock().await.complete(request.generation, result);
        });

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Waits for the latest fetch to finish.
    pub async fn wait_idle(&self) {
        let handle = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    pub async fn snapshot(&self) -> ListController {
        self.controller.lock().await.clone()
    }
}

impl Drop for ListDriver {
    fn drop(&mut self) {
        let handle = self
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/list_tests.rs"]
mod tests;
