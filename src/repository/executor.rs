//! The execution seam: everything below the emitted query is external.
//!
//! Connection handling, transactions, cancellation and timeouts all belong
//! to the implementor; this layer adds none of its own and never retries.

use async_trait::async_trait;
use thiserror::Error;

use crate::sql_generator::SelectQuery;

/// One result row, keyed by the projection names the builder emitted
/// (`alias_field`).
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Failure from the underlying execution resource, propagated to callers
/// unchanged (no translation, no retry).
#[derive(Debug, Error)]
#[error("query execution failed: {message}")]
pub struct ExecutionError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        ExecutionError {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        ExecutionError {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Dispatches emitted queries to the actual engine.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Fetch at most one row. `Ok(None)` for zero matches.
    async fn fetch_one(&self, query: &SelectQuery) -> Result<Option<Row>, ExecutionError>;

    /// Fetch all rows of the paginated statement, in order.
    async fn fetch_all(&self, query: &SelectQuery) -> Result<Vec<Row>, ExecutionError>;

    /// Fetch the requested page plus the total number of matching rows with
    /// the pagination window ignored, in a single dispatch.
    async fn fetch_and_count(&self, query: &SelectQuery)
        -> Result<(Vec<Row>, u64), ExecutionError>;
}
