use thiserror::Error;

/// Result type for runtrace-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the providers layer.
///
/// Malformed vendor data is never an error here; it is skipped and logged.
/// Only output failures and the streaming driver's detection failure surface.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Canonical event could not be written as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The first usable line of a stream matched no known provider
    #[error("Unable to detect source from first event: {event_type}")]
    UndetectedSource { event_type: String },
}
