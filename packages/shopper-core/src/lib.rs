//! Core of the synthetic shopper: drives a browsing task through a
//! storefront to produce a labeled, resumable trace of chosen actions.
//!
//! The engine alternates extraction (classify the fetched page, read its
//! candidate actions) and decision (delegate to the oracle port, or
//! auto-select a forced choice) until a terminal action is chosen or the
//! frontier empties. All network access funnels through a shared,
//! deduplicating fetch cache; every chosen action is persisted, step-indexed,
//! before the loop continues.

pub mod classify;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod oracle;
pub mod scrape;
pub mod storage;
pub mod types;

// Re-exports for clean API
pub use classify::{classify, search_url_for, PageType};
pub use engine::AgentTask;
pub use error::{EngineError, FetchError, StorageError};
pub use fetch::{FetchCache, HttpTransport, PageTransport};
pub use oracle::{serialize_actions, DecisionOracle, DecisionRequest, MAX_STEPS};
pub use scrape::{ActionSource, AmazonScraper};
pub use storage::{AgentStore, SqliteStorage, TaskStore};
pub use types::*;
