use thiserror::Error;

use super::executor::ExecutionError;
use crate::query_tree::QueryTreeError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The request referenced unknown entities, fields or relations;
    /// raised before any SQL is built.
    #[error(transparent)]
    InvalidQuery(#[from] QueryTreeError),
    /// The execution resource failed; passed through unchanged.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
