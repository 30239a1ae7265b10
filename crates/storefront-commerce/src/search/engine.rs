//! The catalog query engine.
//!
//! Owns the pages fetched so far for the current [`QueryMode`], the
//! pagination cursor and the derived visible list. Each fetch is a
//! [`PageRequest`] tagged with the generation it was issued under; every
//! reset bumps the generation, so a response from an abandoned mode is
//! discarded on arrival instead of being appended to the new results.
//!
//! Fetching is split in two so the network call does not hold the engine:
//!
//! ```rust,ignore
//! if let Some(request) = engine.begin_fetch(false) {
//!     let result = request.execute(client.as_ref()).await;
//!     engine.complete_fetch(request, result)?;
//! }
//! ```
//!
//! [`CatalogQueryEngine::fetch_next_page_if_needed`] does all three steps.

use super::pipeline;
use super::query::{normalize_query, QueryMode, SortOption};
use crate::catalog::{CatalogClient, CatalogError, CatalogPage, Product};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Default number of products requested per page.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Default trailing window that triggers a prefetch.
pub const DEFAULT_PREFETCH_WINDOW: usize = 6;

/// Paging knobs for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub page_size: u64,
    pub prefetch_window: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            prefetch_window: DEFAULT_PREFETCH_WINDOW,
        }
    }
}

impl EngineSettings {
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_prefetch_window(mut self, window: usize) -> Self {
        self.prefetch_window = window;
        self
    }
}

/// State published to observers after every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuerySnapshot {
    pub visible: Vec<Product>,
    pub total_available: u64,
    pub loaded_count: usize,
    pub has_more: bool,
    pub is_fetching: bool,
    pub mode: QueryMode,
    pub category_filter: Option<String>,
    pub sort_option: SortOption,
}

/// A page fetch issued by the engine.
///
/// Not `Clone`: a request is completed exactly once. Dropping it without
/// calling [`CatalogQueryEngine::complete_fetch`] leaves the engine marked as
/// fetching until the next reset.
#[derive(Debug, PartialEq, Eq)]
pub struct PageRequest {
    generation: u64,
    mode: QueryMode,
    skip: u64,
    limit: u64,
}

impl PageRequest {
    pub fn mode(&self) -> &QueryMode {
        &self.mode
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run the request against the listing or search endpoint.
    pub async fn execute(&self, client: &dyn CatalogClient) -> Result<CatalogPage, CatalogError> {
        match &self.mode {
            QueryMode::Browse => client.list_products(self.skip, self.limit).await,
            QueryMode::Search { query } => {
                client.search_products(query, self.skip, self.limit).await
            }
        }
    }
}

/// What a fetch call did to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Guard conditions held; no request was made.
    Skipped,
    /// A page was appended.
    Applied { added: usize, total: u64 },
    /// The response belonged to an abandoned mode and was dropped.
    Discarded,
}

/// Paginated, filtered and sorted view over the remote catalog.
pub struct CatalogQueryEngine {
    client: Arc<dyn CatalogClient>,
    settings: EngineSettings,
    mode: QueryMode,
    accumulated: Vec<Product>,
    total_available: u64,
    has_more: bool,
    is_fetching: bool,
    category_filter: Option<String>,
    sort_option: SortOption,
    visible: Vec<Product>,
    generation: u64,
    notifier: watch::Sender<QuerySnapshot>,
}

impl CatalogQueryEngine {
    /// Create an empty engine in browse mode. No fetch is issued.
    pub fn new(client: Arc<dyn CatalogClient>, settings: EngineSettings) -> Self {
        let (notifier, _) = watch::channel(QuerySnapshot {
            has_more: true,
            ..QuerySnapshot::default()
        });
        Self {
            client,
            settings,
            mode: QueryMode::Browse,
            accumulated: Vec::new(),
            total_available: 0,
            has_more: true,
            is_fetching: false,
            category_filter: None,
            sort_option: SortOption::Relevance,
            visible: Vec::new(),
            generation: 0,
            notifier,
        }
    }

    // ---- observation ----

    /// Receive a snapshot after every state change. Only the latest is kept.
    pub fn subscribe(&self) -> watch::Receiver<QuerySnapshot> {
        self.notifier.subscribe()
    }

    pub fn snapshot(&self) -> QuerySnapshot {
        QuerySnapshot {
            visible: self.visible.clone(),
            total_available: self.total_available,
            loaded_count: self.loaded_count(),
            has_more: self.has_more,
            is_fetching: self.is_fetching,
            mode: self.mode.clone(),
            category_filter: self.category_filter.clone(),
            sort_option: self.sort_option,
        }
    }

    pub fn visible(&self) -> &[Product] {
        &self.visible
    }

    pub fn accumulated(&self) -> &[Product] {
        &self.accumulated
    }

    /// Items fetched for the current mode; the next page's skip offset.
    pub fn loaded_count(&self) -> usize {
        self.accumulated.len()
    }

    pub fn total_available(&self) -> u64 {
        self.total_available
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn mode(&self) -> &QueryMode {
        &self.mode
    }

    /// Active search text, empty in browse mode.
    pub fn search_query(&self) -> &str {
        self.mode.query().unwrap_or_default()
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category_filter.as_deref()
    }

    pub fn sort_option(&self) -> SortOption {
        self.sort_option
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Distinct categories among the fetched products, alphabetically.
    pub fn available_categories(&self) -> Vec<String> {
        pipeline::categories(&self.accumulated)
    }

    /// Whether showing `visible_index` should trigger the next page.
    ///
    /// True once the index is within the prefetch window of the end of the
    /// visible list. The threshold saturates at zero, so every index
    /// qualifies when the list is empty or shorter than the window, and so
    /// does any index past the end.
    pub fn should_prefetch(&self, visible_index: usize) -> bool {
        visible_index >= self.visible.len().saturating_sub(self.settings.prefetch_window)
    }

    // ---- fetching ----

    /// Check the fetch guards and, if they pass, mark the engine as fetching.
    ///
    /// Returns `None` while another fetch is in flight, or when not forced and
    /// the current mode has no more pages.
    pub fn begin_fetch(&mut self, force: bool) -> Option<PageRequest> {
        if self.is_fetching {
            debug!("fetch already in flight");
            return None;
        }
        if !force && !self.has_more {
            return None;
        }

        self.is_fetching = true;
        let request = PageRequest {
            generation: self.generation,
            mode: self.mode.clone(),
            skip: self.loaded_count() as u64,
            limit: self.settings.page_size,
        };
        debug!(
            generation = request.generation,
            skip = request.skip,
            limit = request.limit,
            search = request.mode.is_search(),
            "fetching catalog page"
        );
        self.publish();
        Some(request)
    }

    /// Apply the result of `request`.
    ///
    /// A request from an older generation is discarded without touching
    /// state. A failed request clears the fetching flag, keeps the last good
    /// state and returns the error.
    pub fn complete_fetch(
        &mut self,
        request: PageRequest,
        result: Result<CatalogPage, CatalogError>,
    ) -> Result<FetchOutcome, CatalogError> {
        if request.generation != self.generation {
            debug!(
                stale = request.generation,
                current = self.generation,
                "discarding response for abandoned query"
            );
            return Ok(FetchOutcome::Discarded);
        }

        self.is_fetching = false;
        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, skip = request.skip, "catalog page fetch failed");
                self.publish();
                return Err(err);
            }
        };

        let added = page.items.len();
        self.accumulated.extend(page.items);
        self.total_available = page.total;
        // An empty page ends pagination even if the server's total disagrees.
        self.has_more = added > 0 && (self.loaded_count() as u64) < self.total_available;
        debug!(
            added,
            loaded = self.loaded_count(),
            total = self.total_available,
            has_more = self.has_more,
            "catalog page applied"
        );
        self.refresh();
        Ok(FetchOutcome::Applied {
            added,
            total: self.total_available,
        })
    }

    /// Fetch the next page unless a fetch is in flight or, when not forced,
    /// nothing is left to fetch.
    pub async fn fetch_next_page_if_needed(
        &mut self,
        force: bool,
    ) -> Result<FetchOutcome, CatalogError> {
        match self.begin_fetch(force) {
            Some(request) => self.run(request).await,
            None => Ok(FetchOutcome::Skipped),
        }
    }

    /// Drop everything fetched so far, switch to `mode` and issue its first
    /// page request. Any in-flight request becomes stale.
    pub fn begin_reset(&mut self, mode: QueryMode) -> PageRequest {
        self.generation += 1;
        self.mode = mode;
        self.accumulated.clear();
        self.total_available = 0;
        self.has_more = true;
        self.is_fetching = true;
        self.visible = self.project();
        debug!(generation = self.generation, mode = ?self.mode, "query reset");

        let request = PageRequest {
            generation: self.generation,
            mode: self.mode.clone(),
            skip: 0,
            limit: self.settings.page_size,
        };
        self.publish();
        request
    }

    /// Reset to `mode` and fetch its first page.
    pub async fn reset(&mut self, mode: QueryMode) -> Result<FetchOutcome, CatalogError> {
        let request = self.begin_reset(mode);
        self.run(request).await
    }

    async fn run(&mut self, request: PageRequest) -> Result<FetchOutcome, CatalogError> {
        let client = Arc::clone(&self.client);
        let result = request.execute(client.as_ref()).await;
        self.complete_fetch(request, result)
    }

    // ---- query inputs ----

    /// Update the search text, returning the first page request if the mode
    /// changed.
    ///
    /// Empty text in search mode switches back to browse. Non-empty text that
    /// differs from the active query starts a new search. Anything else only
    /// re-runs the local pipeline.
    pub fn begin_search_query(&mut self, text: &str) -> Option<PageRequest> {
        let query = normalize_query(text);
        let next = match (&self.mode, query.is_empty()) {
            (QueryMode::Search { .. }, true) => Some(QueryMode::Browse),
            (QueryMode::Search { query: active }, false) if *active == query => None,
            (_, false) => Some(QueryMode::Search { query }),
            (QueryMode::Browse, true) => None,
        };

        match next {
            Some(mode) => Some(self.begin_reset(mode)),
            None => {
                self.refresh();
                None
            }
        }
    }

    /// Update the search text and fetch if the mode changed.
    pub async fn set_search_query(&mut self, text: &str) -> Result<FetchOutcome, CatalogError> {
        match self.begin_search_query(text) {
            Some(request) => self.run(request).await,
            None => Ok(FetchOutcome::Skipped),
        }
    }

    /// Restrict the visible list to one category. Never fetches.
    pub fn set_category_filter(&mut self, category: Option<String>) {
        self.category_filter = category;
        self.refresh();
    }

    /// Reorder the visible list. Never fetches.
    pub fn set_sort_option(&mut self, option: SortOption) {
        self.sort_option = option;
        self.refresh();
    }

    // ---- internals ----

    fn project(&self) -> Vec<Product> {
        pipeline::apply(
            &self.accumulated,
            self.category_filter.as_deref(),
            self.sort_option,
        )
    }

    fn refresh(&mut self) {
        self.visible = self.project();
        self.publish();
    }

    fn publish(&self) {
        self.notifier.send_replace(self.snapshot());
    }
}

impl std::fmt::Debug for CatalogQueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogQueryEngine")
            .field("mode", &self.mode)
            .field("loaded", &self.accumulated.len())
            .field("visible", &self.visible.len())
            .field("total_available", &self.total_available)
            .field("has_more", &self.has_more)
            .field("is_fetching", &self.is_fetching)
            .field("generation", &self.generation)
            .finish()
    }
}
