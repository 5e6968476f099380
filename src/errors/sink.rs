use thiserror::Error;

/// Failures of the remote log sink. These never reach callers of
/// `Telemetry::emit`; only an installed failure observer sees them.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Log sink request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Log sink answered with status {0}")]
    Status(u16),
}
