//! Error types for the browsing core.

use thiserror::Error;

/// Failure to retrieve a page on a cache miss.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connection refused, timeout, TLS)
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx response from the origin
    #[error("HTTP {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The cache store itself failed
    #[error("cache store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Failure to read or write task/trace/agent state.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted row no longer parses into its in-memory type
    #[error("corrupt row: {0}")]
    Decode(String),
}

/// Abort of a task's execution loop.
///
/// Per-field extraction misses never reach this level; an unmatched oracle
/// reply or an empty frontier is termination, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("decision oracle failed: {0}")]
    Oracle(#[source] anyhow::Error),
}
