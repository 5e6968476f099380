use std::io::Error as IoError;

use serde_json::Error as JsonError;
use thiserror::Error;

/// Error type for link store writes.
///
/// Reads never produce `Serialization`: a collection that fails to parse is
/// treated as empty by the store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage tier could not be read or written
    #[error("Storage I/O error: {0}")]
    Io(#[from] IoError),

    /// Collection could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] JsonError),

    /// No storage tier is configured
    #[error("No storage tier configured")]
    NoBackend,
}
