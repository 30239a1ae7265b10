//! Catalog query engine.
//!
//! Merges server-paginated results with local category filtering and
//! sorting, and decides when the next page should be fetched.

mod engine;
mod pipeline;
mod query;

pub use engine::{CatalogQueryEngine, EngineSettings, FetchOutcome, PageRequest, QuerySnapshot};
pub use pipeline::{apply as apply_pipeline, categories};
pub use query::{normalize_query, QueryMode, SortOption};
