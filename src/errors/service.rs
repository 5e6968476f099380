use thiserror::Error;

use super::{RowError, StoreError};

/// Error type for service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// One or more rows of a creation batch failed validation
    #[error("Batch rejected: {}", join_rows(.0))]
    Rejected(Vec<RowError>),

    /// Request-level validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Wrapped store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

fn join_rows(rows: &[RowError]) -> String {
    rows.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
